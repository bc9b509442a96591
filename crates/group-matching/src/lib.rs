//! Pure rules for group runs.
//!
//! Nothing in this crate performs I/O or takes locks; callers own a
//! [`group_types::GroupRecord`] and mutate it through these functions.
//!
//! - [`matching`] - Compatibility between a group and a run request
//! - [`capacity`] - Status derived from participant count
//! - [`ledger`] - Idempotent join/leave and group founding

pub mod capacity;
pub mod ledger;
pub mod matching;

pub use capacity::StatusTransition;
pub use ledger::{JoinOutcome, Joiner, LeaveOutcome};
pub use matching::{first_match, is_compatible, RunRequest};
