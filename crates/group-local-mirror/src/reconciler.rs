//! Reconciliation between the mirror and the remote group service.
//!
//! ```text
//! read:   mirror (provisional) -> remote fetch -> overwrite mirror
//!                                  \-> failure other than NotFound -> cached + warning
//! write:  remote -> mirror (from server response only)
//! ```

use chrono::Utc;
use group_service_client::GroupService;
use group_types::{
    CreateOrMatchRequest, Group, GroupError, GroupId, GroupResult, JoinRequest, Outcome, UserId,
};
use tracing::{debug, info, warn};

use crate::{MirrorEntry, MirrorStore};

/// A value plus the soft warning raised while producing it.
///
/// `warning` is set when the remote fetch failed and the value came from
/// the mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub value: T,
    pub warning: Option<GroupError>,
}

impl<T> Reconciled<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn cached(value: T, warning: GroupError) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.warning.is_some()
    }
}

/// Keeps a device mirror in sync with the remote group service for one user.
pub struct Reconciler<S, M> {
    service: S,
    mirror: M,
    user: UserId,
}

impl<S: GroupService, M: MirrorStore> Reconciler<S, M> {
    pub fn new(service: S, mirror: M, user: UserId) -> Self {
        Self {
            service,
            mirror,
            user,
        }
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// The provisional read: the mirror's current entry, without contacting
    /// the service. Callers that want something on screen before
    /// [`get_group`](Self::get_group) settles show this first.
    pub fn cached(&self, group_id: &GroupId) -> GroupResult<Option<MirrorEntry>> {
        Ok(self.mirror.get(group_id)?)
    }

    /// Reads a group, preferring the remote copy.
    ///
    /// On success the mirror entry is overwritten with the fetched group and
    /// participants, and `is_joined` follows the fetched list. On any other
    /// failure than `NotFound` the cached entry is returned with the error as
    /// a warning; without a cached entry the failure is returned as is.
    /// `NotFound` always propagates so a deleted group is never masked.
    pub async fn get_group(&self, group_id: &GroupId) -> GroupResult<Reconciled<MirrorEntry>> {
        let local = self.mirror.get(group_id)?;

        match self.service.group(group_id).await {
            Ok(record) => {
                let outcome = local.as_ref().map_or(Outcome::Pending, |e| e.outcome);
                let entry = MirrorEntry::from_record(record, outcome, &self.user, Utc::now());
                if let Some(previous) = &local {
                    if previous.is_joined != entry.is_joined {
                        info!(
                            %group_id,
                            was_joined = previous.is_joined,
                            is_joined = entry.is_joined,
                            "membership corrected from remote"
                        );
                    }
                }
                self.mirror.put(&entry)?;
                Ok(Reconciled::fresh(entry))
            }
            Err(err) if serves_cache(&err) => match local {
                Some(entry) => {
                    warn!(%group_id, error = %err, "remote fetch failed, serving cached group");
                    Ok(Reconciled::cached(entry, err))
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// Create-or-match through the remote service, then record the result.
    pub async fn create_or_match(
        &self,
        request: &CreateOrMatchRequest,
    ) -> GroupResult<MirrorEntry> {
        let response = self.service.create_or_match(request).await?;
        let (outcome, record) = response.into_record();
        let entry = MirrorEntry::from_record(record, outcome, &self.user, Utc::now());
        self.mirror.put(&entry)?;
        info!(group_id = %entry.group.id, %outcome, "group request resolved");
        Ok(entry)
    }

    /// Joins through the remote service, then record the server's view.
    pub async fn join(&self, group_id: &GroupId, request: &JoinRequest) -> GroupResult<MirrorEntry> {
        let record = self.service.join(group_id, request).await?;
        let outcome = self
            .mirror
            .get(group_id)?
            .map_or(Outcome::Matched, |e| e.outcome);
        let entry = MirrorEntry::from_record(record, outcome, &self.user, Utc::now());
        self.mirror.put(&entry)?;
        info!(%group_id, "joined group");
        Ok(entry)
    }

    /// Leaves through the remote service, then clears the local membership.
    ///
    /// Returns the updated entry, or `None` if the group was never mirrored.
    pub async fn leave(&self, group_id: &GroupId) -> GroupResult<Option<MirrorEntry>> {
        self.service.leave(group_id).await?;

        let Some(mut entry) = self.mirror.get(group_id)? else {
            debug!(%group_id, "left group with no mirror entry");
            return Ok(None);
        };
        entry.participants.retain(|p| p.user_id != self.user);
        entry.is_joined = false;
        entry.updated_at = Utc::now();
        self.mirror.put(&entry)?;
        info!(%group_id, "left group");
        Ok(Some(entry))
    }

    /// Upcoming groups, preferring the remote list.
    ///
    /// A successful fetch refreshes the group of every entry already in the
    /// mirror; groups not yet mirrored are not added. When the fetch fails
    /// the mirror's upcoming groups are returned with a warning, unless the
    /// mirror is empty.
    pub async fn upcoming(&self) -> GroupResult<Reconciled<Vec<Group>>> {
        match self.service.upcoming().await {
            Ok(groups) => {
                let now = Utc::now();
                for group in &groups {
                    if let Some(mut entry) = self.mirror.get(&group.id)? {
                        entry.group = group.clone();
                        entry.updated_at = now;
                        self.mirror.put(&entry)?;
                    }
                }
                Ok(Reconciled::fresh(groups))
            }
            Err(err) if serves_cache(&err) => {
                let entries = self.mirror.list()?;
                if entries.is_empty() {
                    return Err(err);
                }
                let now = Utc::now();
                // list() is ascending by start time already.
                let groups: Vec<Group> = entries
                    .into_iter()
                    .map(|e| e.group)
                    .filter(|g| g.start_time >= now)
                    .collect();
                warn!(error = %err, cached = groups.len(), "remote upcoming failed, serving cached groups");
                Ok(Reconciled::cached(groups, err))
            }
            Err(err) => Err(err),
        }
    }

    /// Drops the local entry for a group. Purely local.
    pub fn forget(&self, group_id: &GroupId) -> GroupResult<bool> {
        let removed = self.mirror.delete(group_id)?;
        debug!(%group_id, removed, "mirror entry forgotten");
        Ok(removed)
    }
}

/// Fetch failures that fall back to the mirror.
fn serves_cache(err: &GroupError) -> bool {
    !matches!(err, GroupError::NotFound(_))
}

impl<S, M> std::fmt::Debug for Reconciler<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
