//! Capacity-driven group status.
//!
//! ```text
//! open  <-> full      (participant count vs capacity)
//! open/full -> cancelled   (external action, terminal)
//! ```

use chrono::{DateTime, Utc};
use group_types::{GroupRecord, GroupStatus};

/// A status change produced by a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: GroupStatus,
    pub to: GroupStatus,
}

/// Status for a participant count, leaving `cancelled` untouched.
pub fn derive_status(current: GroupStatus, joined: usize, capacity: u32) -> GroupStatus {
    if current.is_terminal() {
        return current;
    }
    if joined >= capacity as usize {
        GroupStatus::Full
    } else {
        GroupStatus::Open
    }
}

/// Recomputes `record.group.status` from its participant list.
///
/// Returns the transition if the status changed.
pub fn recompute(record: &mut GroupRecord, now: DateTime<Utc>) -> Option<StatusTransition> {
    let from = record.group.status;
    let to = derive_status(from, record.joined_count(), record.group.capacity);
    if from == to {
        return None;
    }
    record.group.status = to;
    record.group.updated_at = now;
    Some(StatusTransition { from, to })
}

/// Marks the group cancelled. Returns the transition, or `None` if it
/// already was.
pub fn cancel(record: &mut GroupRecord, now: DateTime<Utc>) -> Option<StatusTransition> {
    let from = record.group.status;
    if from.is_terminal() {
        return None;
    }
    record.group.status = GroupStatus::Cancelled;
    record.group.updated_at = now;
    Some(StatusTransition {
        from,
        to: GroupStatus::Cancelled,
    })
}

/// True if the status agrees with the participant count.
pub fn is_consistent(record: &GroupRecord) -> bool {
    match record.group.status {
        GroupStatus::Cancelled => true,
        GroupStatus::Full => record.joined_count() >= record.group.capacity as usize,
        GroupStatus::Open => record.joined_count() < record.group.capacity as usize,
    }
}
