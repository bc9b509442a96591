//! Integration tests for the lifecycle coordinator.
//!
//! - `scenario.rs`    - End-to-end create, match, fill, and overflow
//! - `protocol.rs`    - Join/leave/cancel semantics and errors
//! - `side_effects.rs` - Event emission after commit
//! - `concurrency.rs` - Races against capacity and duplicate creation


use chrono::{DateTime, Duration, Utc};
use group_record_store::SqliteGroupStore;
use group_types::{CreateOrMatchRequest, Location};
use std::sync::Arc;

use crate::{Coordinator, RecordingSink};

pub(crate) fn coordinator() -> Coordinator<RecordingSink> {
    let store = Arc::new(SqliteGroupStore::in_memory().unwrap());
    Coordinator::new(store, RecordingSink::new())
}

/// Tomorrow at 07:00 UTC.
pub(crate) fn tomorrow_at_seven() -> DateTime<Utc> {
    let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
    tomorrow.and_hms_opt(7, 0, 0).unwrap().and_utc()
}

pub(crate) fn request(
    kind: &str,
    pace: f64,
    distance: f64,
    start: DateTime<Utc>,
) -> CreateOrMatchRequest {
    CreateOrMatchRequest {
        kind: kind.to_string(),
        distance_km: distance,
        pace_min_per_km: pace,
        start_time: start.to_rfc3339(),
        location: Location {
            lat: 52.5145,
            lng: 13.3501,
            place_name: Some("Tiergarten".to_string()),
        },
        meeting_point: Some("Siegessäule".to_string()),
        display_name: None,
    }
}

pub(crate) fn user_ids(record: &group_types::GroupRecord) -> Vec<String> {
    record
        .participants
        .iter()
        .map(|p| p.user_id.to_string())
        .collect()
}
