//! HTTP client for the group service.

use async_trait::async_trait;
use group_types::{
    CreateOrMatchRequest, CreateOrMatchResponse, Group, GroupId, GroupRecord, GroupResult,
    JoinRequest, LeaveResponse, UpcomingGroupsResponse, UserId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ServiceError, ServiceResult};
use crate::service::GroupService;

/// Talks to `runclub-server` on behalf of one user.
#[derive(Clone)]
pub struct HttpGroupClient {
    http_client: reqwest::Client,
    base_url: Url,
    user_id: UserId,
}

impl HttpGroupClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8787`).
    ///
    /// Every request is bounded by `timeout`; hitting it surfaces as a
    /// transient error.
    pub fn new(base_url: &str, user_id: UserId, timeout: Duration) -> ServiceResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::Config(format!("invalid server url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Config(format!(
                "server url cannot be a base: {base_url}"
            )));
        }
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            user_id,
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Build the URL for a route below the base, percent-encoding each segment.
    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // =========================================================================
    // HTTP helpers
    // =========================================================================

    async fn get<R: DeserializeOwned>(&self, url: Url) -> ServiceResult<R> {
        debug!(%url, "GET");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.user_id.as_str())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> ServiceResult<R> {
        debug!(%url, "POST");
        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.user_id.as_str())
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Check the status, then decode the JSON body.
    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<R> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "group service request failed");
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl GroupService for HttpGroupClient {
    async fn create_or_match(
        &self,
        request: &CreateOrMatchRequest,
    ) -> GroupResult<CreateOrMatchResponse> {
        let url = self.route(&["groups", "create-or-match"]);
        Ok(self.post(url, request).await?)
    }

    async fn join(&self, group_id: &GroupId, request: &JoinRequest) -> GroupResult<GroupRecord> {
        let url = self.route(&["groups", group_id.as_str(), "join"]);
        Ok(self.post(url, request).await?)
    }

    async fn leave(&self, group_id: &GroupId) -> GroupResult<()> {
        let url = self.route(&["groups", group_id.as_str(), "leave"]);
        let _: LeaveResponse = self.post(url, &serde_json::json!({})).await?;
        Ok(())
    }

    async fn group(&self, group_id: &GroupId) -> GroupResult<GroupRecord> {
        let url = self.route(&["groups", group_id.as_str()]);
        Ok(self.get(url).await?)
    }

    async fn upcoming(&self) -> GroupResult<Vec<Group>> {
        let url = self.route(&["groups", "upcoming"]);
        let response: UpcomingGroupsResponse = self.get(url).await?;
        Ok(response.groups)
    }
}

impl std::fmt::Debug for HttpGroupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGroupClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
