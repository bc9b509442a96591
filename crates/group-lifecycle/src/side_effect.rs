//! Side-effect contracts for the lifecycle coordinator.
//!
//! Events are emitted after the record store commit succeeds. Idempotent
//! no-ops emit nothing.

use group_types::{GroupId, GroupStatus, UserId};
use tracing::info;

/// A committed change to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    /// A new group was created with its founder as sole participant.
    GroupCreated {
        group_id: GroupId,
        kind: String,
        founder: UserId,
    },
    /// A user joined a group.
    ParticipantJoined { group_id: GroupId, user_id: UserId },
    /// A user left a group.
    ParticipantLeft { group_id: GroupId, user_id: UserId },
    /// Capacity recomputation changed the status.
    StatusChanged {
        group_id: GroupId,
        from: GroupStatus,
        to: GroupStatus,
    },
    /// The group was cancelled.
    GroupCancelled { group_id: GroupId },
}

/// A sink that receives group events.
pub trait GroupEventSink: Send + Sync {
    /// Called after the corresponding change has been committed.
    fn emit(&self, event: GroupEvent);
}

/// Discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl GroupEventSink for NullSink {
    fn emit(&self, _event: GroupEvent) {}
}

/// Logs each event at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl GroupEventSink for TracingSink {
    fn emit(&self, event: GroupEvent) {
        match &event {
            GroupEvent::GroupCreated {
                group_id,
                kind,
                founder,
            } => info!(%group_id, kind = kind.as_str(), user_id = %founder, "group created"),
            GroupEvent::ParticipantJoined { group_id, user_id } => {
                info!(%group_id, %user_id, "participant joined")
            }
            GroupEvent::ParticipantLeft { group_id, user_id } => {
                info!(%group_id, %user_id, "participant left")
            }
            GroupEvent::StatusChanged { group_id, from, to } => {
                info!(%group_id, %from, %to, "group status changed")
            }
            GroupEvent::GroupCancelled { group_id } => info!(%group_id, "group cancelled"),
        }
    }
}

/// Records all events for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: parking_lot::Mutex<Vec<GroupEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<GroupEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GroupEventSink for RecordingSink {
    fn emit(&self, event: GroupEvent) {
        self.events.lock().push(event);
    }
}
