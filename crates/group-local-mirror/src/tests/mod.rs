//! Reconciler tests against an in-process coordinator.
//!
//! - `reads.rs`  - Remote precedence, cached fallback, hard failures
//! - `writes.rs` - Create/join/leave write-through and upcoming refresh

mod reads;
mod writes;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use group_lifecycle::{Coordinator, NullSink};
use group_record_store::SqliteGroupStore;
use group_service_client::GroupService;
use group_types::{
    CreateOrMatchRequest, CreateOrMatchResponse, Group, GroupError, GroupId, GroupRecord,
    GroupResult, JoinRequest, Location, UserId,
};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{MemoryMirrorStore, Reconciler};

/// The remote service as seen by one user. While `failure` is set every
/// call fails with it.
pub(crate) struct FakeService {
    coordinator: Arc<Coordinator<NullSink>>,
    user: UserId,
    failure: Arc<Mutex<Option<GroupError>>>,
}

impl FakeService {
    fn check_online(&self) -> GroupResult<()> {
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GroupService for FakeService {
    async fn create_or_match(
        &self,
        request: &CreateOrMatchRequest,
    ) -> GroupResult<CreateOrMatchResponse> {
        self.check_online()?;
        self.coordinator.create_or_match(&self.user, request)
    }

    async fn join(&self, group_id: &GroupId, request: &JoinRequest) -> GroupResult<GroupRecord> {
        self.check_online()?;
        self.coordinator.join(group_id, &self.user, request)
    }

    async fn leave(&self, group_id: &GroupId) -> GroupResult<()> {
        self.check_online()?;
        self.coordinator.leave(group_id, &self.user)
    }

    async fn group(&self, group_id: &GroupId) -> GroupResult<GroupRecord> {
        self.check_online()?;
        self.coordinator.group(group_id)
    }

    async fn upcoming(&self) -> GroupResult<Vec<Group>> {
        self.check_online()?;
        self.coordinator.upcoming()
    }
}

/// A shared backend plus one device per user.
pub(crate) struct World {
    pub coordinator: Arc<Coordinator<NullSink>>,
    failure: Arc<Mutex<Option<GroupError>>>,
}

pub(crate) type Device = Reconciler<FakeService, MemoryMirrorStore>;

impl World {
    pub fn new() -> Self {
        let store = Arc::new(SqliteGroupStore::in_memory().unwrap());
        Self {
            coordinator: Arc::new(Coordinator::new(store, NullSink)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn device(&self, user: &str) -> Device {
        let service = FakeService {
            coordinator: self.coordinator.clone(),
            user: UserId::from(user),
            failure: self.failure.clone(),
        };
        Reconciler::new(service, MemoryMirrorStore::new(), UserId::from(user))
    }

    pub fn go_offline(&self) {
        self.fail_with(GroupError::Transient("connection refused".to_string()));
    }

    /// Makes every remote call fail with `err`.
    pub fn fail_with(&self, err: GroupError) {
        *self.failure.lock() = Some(err);
    }
}

pub(crate) fn tomorrow_at_seven() -> DateTime<Utc> {
    let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
    tomorrow.and_hms_opt(7, 0, 0).unwrap().and_utc()
}

pub(crate) fn request(kind: &str, start: DateTime<Utc>) -> CreateOrMatchRequest {
    CreateOrMatchRequest {
        kind: kind.to_string(),
        distance_km: 10.0,
        pace_min_per_km: 5.0,
        start_time: start.to_rfc3339(),
        location: Location {
            lat: 40.7812,
            lng: -73.9665,
            place_name: Some("Central Park".to_string()),
        },
        meeting_point: Some("Bethesda Fountain".to_string()),
        display_name: None,
    }
}

pub(crate) fn user_ids(participants: &[group_types::Participant]) -> Vec<&str> {
    participants.iter().map(|p| p.user_id.as_str()).collect()
}
