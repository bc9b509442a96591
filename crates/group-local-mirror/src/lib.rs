//! # Local Mirror
//!
//! Device-side cache of the groups the current user has seen or joined,
//! kept in sync with the remote group service by the [`Reconciler`].
//!
//! - Reads return fresh remote data when reachable and fall back to the
//!   cached entry (with a warning) on transient failures.
//! - Writes go to the remote service first; the mirror is updated only from
//!   the server's response.
//!
//! The mirror is an injected [`MirrorStore`]: [`SqliteMirrorStore`] on
//! devices, [`MemoryMirrorStore`] in tests.

mod entry;
mod reconciler;
mod sqlite;
mod store;

#[cfg(test)]
mod tests;

pub use entry::MirrorEntry;
pub use reconciler::{Reconciled, Reconciler};
pub use sqlite::SqliteMirrorStore;
pub use store::{MemoryMirrorStore, MirrorError, MirrorResult, MirrorStore};
