//! Request validation at the coordinator boundary.

use chrono::{DateTime, Utc};
use group_matching::RunRequest;
use group_types::{CreateOrMatchRequest, GroupError, GroupResult, Location};

/// Validates a create-or-match request and converts it into a [`RunRequest`].
pub fn run_request(req: &CreateOrMatchRequest) -> GroupResult<RunRequest> {
    if req.kind.trim().is_empty() {
        return Err(GroupError::validation("kind", "kind must not be empty"));
    }
    positive("distance_km", req.distance_km)?;
    positive("pace_min_per_km", req.pace_min_per_km)?;
    let start_time = start_time(&req.start_time)?;
    location(&req.location)?;

    Ok(RunRequest {
        kind: req.kind.clone(),
        distance_km: req.distance_km,
        pace_min_per_km: req.pace_min_per_km,
        start_time,
        location: req.location.clone(),
        meeting_point: req.meeting_point.clone(),
    })
}

/// Validates the optional personal pace on a join.
pub fn join_pace(pace: Option<f64>) -> GroupResult<()> {
    match pace {
        Some(p) => positive("pace_min_per_km", p),
        None => Ok(()),
    }
}

fn positive(field: &str, value: f64) -> GroupResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GroupError::validation(
            field,
            format!("{field} must be a positive number"),
        ))
    }
}

fn start_time(raw: &str) -> GroupResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            GroupError::validation("start_time", format!("start_time is not RFC 3339: {e}"))
        })
}

fn location(loc: &Location) -> GroupResult<()> {
    if !(loc.lat.is_finite() && (-90.0..=90.0).contains(&loc.lat)) {
        return Err(GroupError::validation(
            "location.lat",
            "latitude must be between -90 and 90",
        ));
    }
    if !(loc.lng.is_finite() && (-180.0..=180.0).contains(&loc.lng)) {
        return Err(GroupError::validation(
            "location.lng",
            "longitude must be between -180 and 180",
        ));
    }
    Ok(())
}
