//! # Group Record Store
//!
//! Durable keyed storage of group records and their participant lists.
//! After reconciliation this is the ground truth for every group.
//!
//! Groups are never deleted; a record is only ever replaced by a newer
//! version of itself. Listing returns groups in creation order so that
//! first-match-wins scans are reproducible.

mod sqlite;

use chrono::{DateTime, Utc};
use group_types::{Group, GroupError, GroupId, GroupRecord};

pub use sqlite::SqliteGroupStore;

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for GroupError {
    fn from(err: StoreError) -> Self {
        GroupError::Internal(err.to_string())
    }
}

/// Keyed storage of group records.
pub trait GroupStore: Send + Sync {
    /// Loads a group and its participants.
    fn get(&self, id: &GroupId) -> StoreResult<Option<GroupRecord>>;

    /// Inserts or replaces a group and its full participant list atomically.
    fn put(&self, record: &GroupRecord) -> StoreResult<()>;

    /// Non-cancelled groups of `kind` (open and full), in creation order.
    fn matchable_groups_of_kind(&self, kind: &str) -> StoreResult<Vec<Group>>;

    /// Groups starting at or after `now`, ascending by start time. Cancelled
    /// groups are included so clients can show them as such.
    fn upcoming(&self, now: DateTime<Utc>) -> StoreResult<Vec<Group>>;
}
