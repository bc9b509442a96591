//! The lifecycle coordinator.
//!
//! # Locking
//!
//! ```text
//! create_or_match:  kind lock -> scan -> group lock -> join      (hit)
//!                   kind lock -> scan -> insert new group        (miss)
//! join / leave / cancel:                 group lock -> mutate
//! ```
//!
//! Matching requires identical kinds, so two create-or-match requests can
//! only merge into the same group if they share a kind. Holding the kind
//! lock across scan-then-join (or scan-then-create) means two compatible
//! requests can never both decide to create. Locks are always taken in the
//! order kind -> group, and join/leave/cancel never take a kind lock, so
//! there is no lock-order inversion.
//!
//! # Write path
//!
//! 1. Load the record under the group lock
//! 2. Apply the ledger / capacity rules
//! 3. Commit to the record store
//! 4. Emit side-effects
//!
//! If step 3 fails nothing is emitted.

use chrono::{DateTime, SubsecRound, Utc};
use group_matching::ledger::{self, Joiner};
use group_matching::{capacity, is_compatible, JoinOutcome, LeaveOutcome, StatusTransition};
use group_record_store::GroupStore;
use group_types::{
    CreateOrMatchRequest, CreateOrMatchResponse, Group, GroupError, GroupId, GroupRecord,
    GroupResult, JoinRequest, Outcome, UserId, DEFAULT_CAPACITY,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::locks::LockTable;
use crate::side_effect::{GroupEvent, GroupEventSink};
use crate::validate;

/// Orchestrates create-or-match, join, leave, and cancel.
///
/// All mutations of a given group are serialized through its group lock.
/// Operations on different groups run in parallel.
pub struct Coordinator<K: GroupEventSink> {
    store: Arc<dyn GroupStore>,
    sink: Arc<K>,
    kind_locks: LockTable,
    group_locks: LockTable,
    capacity: u32,
}

impl<K: GroupEventSink> Coordinator<K> {
    /// Creates a coordinator over `store`, emitting events to `sink`.
    pub fn new(store: Arc<dyn GroupStore>, sink: K) -> Self {
        Self {
            store,
            sink: Arc::new(sink),
            kind_locks: LockTable::new(),
            group_locks: LockTable::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Overrides the capacity given to newly created groups.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns a reference to the event sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Joins the first compatible open group of the same kind, or creates a
    /// new group with `user` as its only participant.
    pub fn create_or_match(
        &self,
        user: &UserId,
        request: &CreateOrMatchRequest,
    ) -> GroupResult<CreateOrMatchResponse> {
        let run = validate::run_request(request)?;
        let joiner = Joiner {
            user_id: user.clone(),
            display_name: request.display_name.clone(),
            pace_min_per_km: Some(run.pace_min_per_km),
        };

        let kind_lock = self.kind_locks.handle(&run.kind);
        let _kind_guard = kind_lock.lock();

        // Full groups stay in the scan so a repeat request from a member
        // resolves to the group it is already in.
        let candidates = self.store.matchable_groups_of_kind(&run.kind)?;
        for candidate in candidates.iter().filter(|g| is_compatible(g, &run)) {
            match self.join_locked(&candidate.id, joiner.clone()) {
                Ok(record) => {
                    info!(
                        group_id = %record.group.id,
                        user_id = %user,
                        participants = record.participants.len(),
                        "request matched existing group"
                    );
                    return Ok(CreateOrMatchResponse::new(Outcome::Matched, record));
                }
                // Full, or cancelled between the scan and the group lock.
                Err(GroupError::Conflict(id)) | Err(GroupError::Terminal(id)) => {
                    debug!(group_id = %id, "candidate not joinable, trying next");
                }
                Err(GroupError::NotFound(id)) => {
                    debug!(group_id = %id, "candidate vanished, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        let (record, transition) =
            ledger::found_group(GroupId::new(), run, self.capacity, joiner, now());
        self.store.put(&record)?;

        self.sink.emit(GroupEvent::GroupCreated {
            group_id: record.group.id.clone(),
            kind: record.group.kind.clone(),
            founder: user.clone(),
        });
        self.emit_transition(&record.group.id, transition);
        info!(
            group_id = %record.group.id,
            user_id = %user,
            kind = record.group.kind.as_str(),
            capacity = record.group.capacity,
            "no compatible group, created new one"
        );
        Ok(CreateOrMatchResponse::new(Outcome::Created, record))
    }

    /// Adds `user` to the group. Joining a group the user is already in
    /// returns the group unchanged.
    pub fn join(
        &self,
        group_id: &GroupId,
        user: &UserId,
        request: &JoinRequest,
    ) -> GroupResult<GroupRecord> {
        validate::join_pace(request.pace_min_per_km)?;
        let joiner = Joiner {
            user_id: user.clone(),
            display_name: request.display_name.clone(),
            pace_min_per_km: request.pace_min_per_km,
        };
        self.join_locked(group_id, joiner)
    }

    fn join_locked(&self, group_id: &GroupId, joiner: Joiner) -> GroupResult<GroupRecord> {
        let lock = self.group_locks.handle(group_id.as_str());
        let _guard = lock.lock();

        let mut record = self.load(group_id)?;
        let user = joiner.user_id.clone();
        match ledger::join(&mut record, joiner, now())? {
            JoinOutcome::AlreadyJoined => {
                debug!(%group_id, user_id = %user, "already joined, nothing to do");
            }
            JoinOutcome::Joined { transition } => {
                self.store.put(&record)?;
                self.sink.emit(GroupEvent::ParticipantJoined {
                    group_id: group_id.clone(),
                    user_id: user,
                });
                self.emit_transition(group_id, transition);
            }
        }
        Ok(record)
    }

    /// Removes `user` from the group. Leaving a group the user is not in is
    /// a successful no-op.
    pub fn leave(&self, group_id: &GroupId, user: &UserId) -> GroupResult<()> {
        let lock = self.group_locks.handle(group_id.as_str());
        let _guard = lock.lock();

        let mut record = self.load(group_id)?;
        match ledger::leave(&mut record, user, now()) {
            LeaveOutcome::NotMember => {
                debug!(%group_id, user_id = %user, "not a member, nothing to do");
            }
            LeaveOutcome::Left { transition } => {
                self.store.put(&record)?;
                self.sink.emit(GroupEvent::ParticipantLeft {
                    group_id: group_id.clone(),
                    user_id: user.clone(),
                });
                self.emit_transition(group_id, transition);
            }
        }
        Ok(())
    }

    /// Cancels the group. Cancellation is terminal and idempotent.
    pub fn cancel(&self, group_id: &GroupId) -> GroupResult<GroupRecord> {
        let lock = self.group_locks.handle(group_id.as_str());
        let _guard = lock.lock();

        let mut record = self.load(group_id)?;
        if capacity::cancel(&mut record, now()).is_some() {
            self.store.put(&record)?;
            self.sink.emit(GroupEvent::GroupCancelled {
                group_id: group_id.clone(),
            });
        }
        Ok(record)
    }

    /// Reads a group and its participants.
    pub fn group(&self, group_id: &GroupId) -> GroupResult<GroupRecord> {
        self.load(group_id)
    }

    /// Groups starting from now on, ascending by start time.
    pub fn upcoming(&self) -> GroupResult<Vec<Group>> {
        self.upcoming_at(Utc::now())
    }

    /// Groups starting at or after `now`, ascending by start time.
    pub fn upcoming_at(&self, now: DateTime<Utc>) -> GroupResult<Vec<Group>> {
        Ok(self.store.upcoming(now)?)
    }

    fn load(&self, group_id: &GroupId) -> GroupResult<GroupRecord> {
        self.store
            .get(group_id)?
            .ok_or_else(|| GroupError::NotFound(group_id.clone()))
    }

    fn emit_transition(&self, group_id: &GroupId, transition: Option<StatusTransition>) {
        if let Some(StatusTransition { from, to }) = transition {
            self.sink.emit(GroupEvent::StatusChanged {
                group_id: group_id.clone(),
                from,
                to,
            });
        }
    }
}

/// Current time at the millisecond precision the record store keeps, so a
/// write response and a later read agree.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
