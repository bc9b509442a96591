//! Join/leave over a group's participant list.
//!
//! At most one entry per (group, user). Joining twice and leaving a group the
//! user is not in are successful no-ops.

use chrono::{DateTime, Utc};
use group_types::{
    Group, GroupError, GroupId, GroupRecord, GroupResult, GroupStatus, Participant, UserId,
};

use crate::capacity::{self, StatusTransition};
use crate::matching::RunRequest;

/// The joining user's details.
#[derive(Debug, Clone, PartialEq)]
pub struct Joiner {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub pace_min_per_km: Option<f64>,
}

impl Joiner {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
            pace_min_per_km: None,
        }
    }

    fn into_participant(self, now: DateTime<Utc>) -> Participant {
        Participant::joined(self.user_id, self.display_name, self.pace_min_per_km, now)
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A `joined` entry was written.
    Joined { transition: Option<StatusTransition> },
    /// The user already held a `joined` entry; nothing changed.
    AlreadyJoined,
}

/// Result of a successful leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left { transition: Option<StatusTransition> },
    /// The user had no entry; nothing changed.
    NotMember,
}

/// Adds `joiner` to the group.
///
/// Fails with `Terminal` on a cancelled group and `Conflict` when the group
/// has no room for a new member. A `pending` or `left` entry for the same
/// user is upgraded in place.
pub fn join(
    record: &mut GroupRecord,
    joiner: Joiner,
    now: DateTime<Utc>,
) -> GroupResult<JoinOutcome> {
    if record.group.status.is_terminal() {
        return Err(GroupError::Terminal(record.group.id.clone()));
    }
    if record.is_joined(&joiner.user_id) {
        return Ok(JoinOutcome::AlreadyJoined);
    }
    if record.joined_count() >= record.group.capacity as usize {
        return Err(GroupError::Conflict(record.group.id.clone()));
    }

    let entry = joiner.into_participant(now);
    match record
        .participants
        .iter_mut()
        .find(|p| p.user_id == entry.user_id)
    {
        Some(existing) => *existing = entry,
        None => record.participants.push(entry),
    }
    record.group.updated_at = now;

    let transition = capacity::recompute(record, now);
    Ok(JoinOutcome::Joined { transition })
}

/// Removes `user` from the group.
///
/// On a cancelled group the entry is removed but the status stays cancelled.
pub fn leave(record: &mut GroupRecord, user: &UserId, now: DateTime<Utc>) -> LeaveOutcome {
    let before = record.participants.len();
    record.participants.retain(|p| &p.user_id != user);
    if record.participants.len() == before {
        return LeaveOutcome::NotMember;
    }
    record.group.updated_at = now;

    let transition = capacity::recompute(record, now);
    LeaveOutcome::Left { transition }
}

/// Builds a new group seeded with `founder` as its only participant.
///
/// The group starts `open`; the returned transition is set when the founder
/// alone fills it.
pub fn found_group(
    id: GroupId,
    request: RunRequest,
    capacity: u32,
    founder: Joiner,
    now: DateTime<Utc>,
) -> (GroupRecord, Option<StatusTransition>) {
    let mut record = GroupRecord {
        group: Group {
            id,
            kind: request.kind,
            distance_km: request.distance_km,
            pace_min_per_km: request.pace_min_per_km,
            start_time: request.start_time,
            location: request.location,
            meeting_point: request.meeting_point,
            capacity,
            status: GroupStatus::Open,
            created_at: now,
            updated_at: now,
        },
        participants: vec![founder.into_participant(now)],
    };
    let transition = capacity::recompute(&mut record, now);
    (record, transition)
}
