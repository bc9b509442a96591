use chrono::{DateTime, Utc};
use group_types::{Group, GroupRecord, Outcome, Participant, UserId};
use serde::{Deserialize, Serialize};

/// Last-known state of one group on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub group: Group,
    pub participants: Vec<Participant>,
    pub outcome: Outcome,
    /// Whether the device's user is a joined participant.
    pub is_joined: bool,
    pub updated_at: DateTime<Utc>,
}

impl MirrorEntry {
    /// Builds an entry from a server record, deriving `is_joined` for `user`.
    pub fn from_record(
        record: GroupRecord,
        outcome: Outcome,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let is_joined = record.is_joined(user);
        Self {
            group: record.group,
            participants: record.participants,
            outcome,
            is_joined,
            updated_at: now,
        }
    }

    pub fn record(&self) -> GroupRecord {
        GroupRecord {
            group: self.group.clone(),
            participants: self.participants.clone(),
        }
    }
}
