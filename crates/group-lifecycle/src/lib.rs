//! # Group Lifecycle
//!
//! The single serialization point for group mutations. Validates requests,
//! runs the matching scan, applies the participant ledger and capacity
//! rules, commits to the record store, then emits side-effects.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use group_lifecycle::{Coordinator, RecordingSink};
//! use group_record_store::SqliteGroupStore;
//! use group_types::{CreateOrMatchRequest, Location, Outcome, UserId};
//!
//! let store = Arc::new(SqliteGroupStore::in_memory().unwrap());
//! let coordinator = Coordinator::new(store, RecordingSink::new());
//!
//! let request = CreateOrMatchRequest {
//!     kind: "easy".into(),
//!     distance_km: 10.0,
//!     pace_min_per_km: 5.0,
//!     start_time: "2030-05-01T07:00:00Z".into(),
//!     location: Location { lat: 52.52, lng: 13.40, place_name: None },
//!     meeting_point: None,
//!     display_name: None,
//! };
//! let first = coordinator.create_or_match(&UserId::from("u1"), &request).unwrap();
//! let second = coordinator.create_or_match(&UserId::from("u2"), &request).unwrap();
//! assert_eq!(first.outcome, Outcome::Created);
//! assert_eq!(second.outcome, Outcome::Matched);
//! assert_eq!(first.group.id, second.group.id);
//! ```

mod coordinator;
mod locks;
pub mod side_effect;
pub mod validate;

#[cfg(test)]
mod tests;

pub use coordinator::Coordinator;
pub use side_effect::{GroupEvent, GroupEventSink, NullSink, RecordingSink, TracingSink};
