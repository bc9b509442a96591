//! Request and response payloads for the group service.

use crate::types::{Group, GroupRecord, Location, Outcome, Participant};
use serde::{Deserialize, Serialize};

/// `POST /groups/create-or-match` body.
///
/// `start_time` stays a string here; the coordinator parses and validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrMatchRequest {
    pub kind: String,
    pub distance_km: f64,
    pub pace_min_per_km: f64,
    pub start_time: String,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrMatchResponse {
    pub outcome: Outcome,
    pub group: Group,
    pub participants: Vec<Participant>,
}

impl CreateOrMatchResponse {
    pub fn new(outcome: Outcome, record: GroupRecord) -> Self {
        Self {
            outcome,
            group: record.group,
            participants: record.participants,
        }
    }

    pub fn into_record(self) -> (Outcome, GroupRecord) {
        (
            self.outcome,
            GroupRecord {
                group: self.group,
                participants: self.participants,
            },
        )
    }
}

/// `POST /groups/{id}/join` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingGroupsResponse {
    pub groups: Vec<Group>,
}
