//! Mirror store contract and the in-memory implementation.

use group_types::{GroupError, GroupId};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::MirrorEntry;

/// Errors from a mirror store.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row could not be decoded.
    #[error("corrupt mirror entry: {0}")]
    Corrupt(String),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

impl From<MirrorError> for GroupError {
    fn from(err: MirrorError) -> Self {
        GroupError::Internal(err.to_string())
    }
}

/// One entry per group, keyed by group id.
pub trait MirrorStore: Send + Sync {
    fn get(&self, id: &GroupId) -> MirrorResult<Option<MirrorEntry>>;

    /// Inserts or replaces the entry for `entry.group.id`.
    fn put(&self, entry: &MirrorEntry) -> MirrorResult<()>;

    /// Removes the entry. Returns false if there was none.
    fn delete(&self, id: &GroupId) -> MirrorResult<bool>;

    /// All entries, ascending by group start time.
    fn list(&self) -> MirrorResult<Vec<MirrorEntry>>;
}

/// Mirror kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryMirrorStore {
    entries: RwLock<HashMap<GroupId, MirrorEntry>>,
}

impl MemoryMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MirrorStore for MemoryMirrorStore {
    fn get(&self, id: &GroupId) -> MirrorResult<Option<MirrorEntry>> {
        Ok(self.entries.read().get(id).cloned())
    }

    fn put(&self, entry: &MirrorEntry) -> MirrorResult<()> {
        self.entries
            .write()
            .insert(entry.group.id.clone(), entry.clone());
        Ok(())
    }

    fn delete(&self, id: &GroupId) -> MirrorResult<bool> {
        Ok(self.entries.write().remove(id).is_some())
    }

    fn list(&self) -> MirrorResult<Vec<MirrorEntry>> {
        let mut entries: Vec<_> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| {
            a.group
                .start_time
                .cmp(&b.group.start_time)
                .then_with(|| a.group.id.as_str().cmp(b.group.id.as_str()))
        });
        Ok(entries)
    }
}

impl<T: MirrorStore + ?Sized> MirrorStore for std::sync::Arc<T> {
    fn get(&self, id: &GroupId) -> MirrorResult<Option<MirrorEntry>> {
        (**self).get(id)
    }

    fn put(&self, entry: &MirrorEntry) -> MirrorResult<()> {
        (**self).put(entry)
    }

    fn delete(&self, id: &GroupId) -> MirrorResult<bool> {
        (**self).delete(id)
    }

    fn list(&self) -> MirrorResult<Vec<MirrorEntry>> {
        (**self).list()
    }
}
