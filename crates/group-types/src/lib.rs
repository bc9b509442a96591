//! Shared types for group runs.
//!
//! - [`types`] - Groups, participants, statuses, outcomes
//! - [`wire`] - Request/response payloads for the group service
//! - [`error`] - Domain error taxonomy and its JSON envelope

pub mod error;
pub mod types;
pub mod wire;

pub use error::{ErrorBody, ErrorCode, ErrorDetail, GroupError, GroupResult};
pub use types::{
    Group, GroupId, GroupRecord, GroupStatus, Location, Outcome, Participant, ParticipantStatus,
    UserId, DEFAULT_CAPACITY,
};
pub use wire::{
    CreateOrMatchRequest, CreateOrMatchResponse, JoinRequest, LeaveResponse,
    UpcomingGroupsResponse,
};
