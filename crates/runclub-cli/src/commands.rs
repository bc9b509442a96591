//! Command execution against the reconciler.

use group_local_mirror::{MirrorStore, Reconciled, Reconciler};
use group_service_client::GroupService;
use group_types::{CreateOrMatchRequest, GroupError, GroupId, GroupResult, JoinRequest, Location};
use serde::Serialize;
use serde_json::{json, Value};

use crate::Commands;

/// What a command prints: a JSON document plus soft warnings for stderr.
#[derive(Debug)]
pub struct Output {
    pub value: Value,
    pub warnings: Vec<GroupError>,
}

impl Output {
    fn new(value: impl Serialize) -> GroupResult<Self> {
        Ok(Self {
            value: to_value(value)?,
            warnings: Vec::new(),
        })
    }

    fn reconciled<T: Serialize>(reconciled: Reconciled<T>) -> GroupResult<Self> {
        Ok(Self {
            value: to_value(reconciled.value)?,
            warnings: reconciled.warning.into_iter().collect(),
        })
    }
}

fn to_value(value: impl Serialize) -> GroupResult<Value> {
    serde_json::to_value(value).map_err(|e| GroupError::Internal(format!("render output: {e}")))
}

pub(crate) async fn execute<S, M>(reconciler: &Reconciler<S, M>, command: Commands) -> GroupResult<Output>
where
    S: GroupService,
    M: MirrorStore,
{
    match command {
        Commands::Request {
            kind,
            distance_km,
            pace,
            start,
            lat,
            lng,
            place,
            meeting_point,
            name,
        } => {
            let request = CreateOrMatchRequest {
                kind,
                distance_km,
                pace_min_per_km: pace,
                start_time: start,
                location: Location {
                    lat,
                    lng,
                    place_name: place,
                },
                meeting_point,
                display_name: name,
            };
            Output::new(reconciler.create_or_match(&request).await?)
        }
        Commands::Join {
            group_id,
            pace,
            name,
        } => {
            let request = JoinRequest {
                pace_min_per_km: pace,
                display_name: name,
            };
            Output::new(reconciler.join(&GroupId::from(group_id), &request).await?)
        }
        Commands::Leave { group_id } => {
            let id = GroupId::from(group_id);
            match reconciler.leave(&id).await? {
                Some(entry) => Output::new(entry),
                None => Output::new(json!({ "group_id": id, "left": true })),
            }
        }
        Commands::Show { group_id } => {
            Output::reconciled(reconciler.get_group(&GroupId::from(group_id)).await?)
        }
        Commands::Upcoming => Output::reconciled(reconciler.upcoming().await?),
        Commands::Forget { group_id } => {
            let id = GroupId::from(group_id);
            let forgotten = reconciler.forget(&id)?;
            Output::new(json!({ "group_id": id, "forgotten": forgotten }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use group_local_mirror::MemoryMirrorStore;
    use group_types::{CreateOrMatchResponse, Group, GroupRecord, UserId};
    use std::sync::{Arc, Mutex};

    /// Records what reached the service and fails every call as unreachable.
    #[derive(Default, Clone)]
    struct Unreachable {
        creates: Arc<Mutex<Vec<CreateOrMatchRequest>>>,
        joins: Arc<Mutex<Vec<(GroupId, JoinRequest)>>>,
    }

    fn offline() -> GroupError {
        GroupError::Transient("connection refused".into())
    }

    #[async_trait]
    impl GroupService for Unreachable {
        async fn create_or_match(
            &self,
            request: &CreateOrMatchRequest,
        ) -> GroupResult<CreateOrMatchResponse> {
            self.creates.lock().unwrap().push(request.clone());
            Err(offline())
        }

        async fn join(&self, group_id: &GroupId, request: &JoinRequest) -> GroupResult<GroupRecord> {
            self.joins
                .lock()
                .unwrap()
                .push((group_id.clone(), request.clone()));
            Err(offline())
        }

        async fn leave(&self, _group_id: &GroupId) -> GroupResult<()> {
            Err(offline())
        }

        async fn group(&self, _group_id: &GroupId) -> GroupResult<GroupRecord> {
            Err(offline())
        }

        async fn upcoming(&self) -> GroupResult<Vec<Group>> {
            Err(offline())
        }
    }

    fn reconciler() -> (Reconciler<Unreachable, MemoryMirrorStore>, Unreachable) {
        let service = Unreachable::default();
        let reconciler = Reconciler::new(
            service.clone(),
            MemoryMirrorStore::new(),
            UserId::from("u1"),
        );
        (reconciler, service)
    }

    #[tokio::test]
    async fn request_flags_map_onto_create_body() {
        let (reconciler, service) = reconciler();
        let command = Commands::Request {
            kind: "tempo".into(),
            distance_km: 8.0,
            pace: 4.5,
            start: "2026-10-20T07:00:00Z".into(),
            lat: 40.78,
            lng: -73.97,
            place: Some("Central Park".into()),
            meeting_point: None,
            name: Some("Ana".into()),
        };
        let err = execute(&reconciler, command).await.unwrap_err();
        assert!(err.is_retryable());

        let sent = service.creates.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, "tempo");
        assert_eq!(sent[0].pace_min_per_km, 4.5);
        assert_eq!(sent[0].location.place_name.as_deref(), Some("Central Park"));
        assert_eq!(sent[0].display_name.as_deref(), Some("Ana"));
        assert!(reconciler.mirror().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_flags_map_onto_join_body() {
        let (reconciler, service) = reconciler();
        let command = Commands::Join {
            group_id: "g-1".into(),
            pace: Some(5.5),
            name: None,
        };
        assert!(execute(&reconciler, command).await.is_err());

        let joins = service.joins.lock().unwrap().clone();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].0, GroupId::from("g-1"));
        assert_eq!(joins[0].1.pace_min_per_km, Some(5.5));
        assert!(reconciler.cached(&GroupId::from("g-1")).unwrap().is_none());
    }

    #[tokio::test]
    async fn show_without_cache_surfaces_the_failure() {
        let (reconciler, _) = reconciler();
        let err = execute(
            &reconciler,
            Commands::Show {
                group_id: "g-1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, offline());
    }

    #[tokio::test]
    async fn forget_reports_whether_anything_was_removed() {
        let (reconciler, _) = reconciler();
        let output = execute(
            &reconciler,
            Commands::Forget {
                group_id: "g-1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output.value, json!({ "group_id": "g-1", "forgotten": false }));
        assert!(output.warnings.is_empty());
    }
}
