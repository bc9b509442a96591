//! Client side of the remote group service.
//!
//! [`GroupService`] is the seam the local mirror reconciles against.
//! [`HttpGroupClient`] implements it over the JSON/HTTP routes served by
//! `runclub-server`, authenticating every request with the caller's user id
//! as a bearer token.

mod client;
mod error;
mod service;

pub use client::HttpGroupClient;
pub use error::{ServiceError, ServiceResult};
pub use service::GroupService;
