//! Compatibility test between an existing group and a new run request.
//!
//! A request merges into a group when the kind is identical and start time,
//! pace and distance are each within a fixed tolerance. Location is carried
//! on the request but does not take part in the test.

use chrono::{DateTime, Utc};
use group_types::{Group, Location};

/// Maximum start time difference, in minutes.
pub const START_TIME_TOLERANCE_MINUTES: i64 = 60;
/// Maximum pace difference, in minutes per km.
pub const PACE_TOLERANCE_MIN_PER_KM: f64 = 0.5;
/// Maximum distance difference, in km.
pub const DISTANCE_TOLERANCE_KM: f64 = 0.5;

/// Absorbs float noise at the tolerance boundary (e.g. 5.3 - 4.8).
const FLOAT_SLACK: f64 = 1e-9;

/// A validated request for a group run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub kind: String,
    pub distance_km: f64,
    pub pace_min_per_km: f64,
    pub start_time: DateTime<Utc>,
    pub location: Location,
    pub meeting_point: Option<String>,
}

/// Returns true if `request` may merge into `group`.
///
/// Cancelled groups never match.
pub fn is_compatible(group: &Group, request: &RunRequest) -> bool {
    if group.status.is_terminal() {
        return false;
    }
    if group.kind != request.kind {
        return false;
    }

    let start_gap_ms = (group.start_time - request.start_time)
        .num_milliseconds()
        .abs();
    if start_gap_ms > START_TIME_TOLERANCE_MINUTES * 60 * 1000 {
        return false;
    }

    within(group.pace_min_per_km, request.pace_min_per_km, PACE_TOLERANCE_MIN_PER_KM)
        && within(group.distance_km, request.distance_km, DISTANCE_TOLERANCE_KM)
}

/// First compatible group in iteration order.
///
/// Callers pass groups in a stable order (creation order in the record
/// store) so that the same inputs always pick the same group.
pub fn first_match<'a, I>(groups: I, request: &RunRequest) -> Option<&'a Group>
where
    I: IntoIterator<Item = &'a Group>,
{
    groups.into_iter().find(|g| is_compatible(g, request))
}

fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance + FLOAT_SLACK
}
