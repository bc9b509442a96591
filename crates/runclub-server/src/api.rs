//! Route handlers and the HTTP error mapping.
//!
//! The coordinator is synchronous and may block on SQLite or a group lock,
//! so every call runs on the blocking pool.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use group_lifecycle::{Coordinator, GroupEventSink};
use group_types::{
    CreateOrMatchRequest, CreateOrMatchResponse, ErrorBody, ErrorCode, ErrorDetail, GroupError,
    GroupId, GroupRecord, GroupResult, JoinRequest, LeaveResponse, UpcomingGroupsResponse, UserId,
};
use tracing::{debug, error};

use crate::app::AppState;

/// Error returned by handlers, rendered as the JSON error envelope.
#[derive(Debug)]
pub(crate) enum ApiError {
    Group(GroupError),
    Unauthorized(&'static str),
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        Self::Group(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Group(GroupError::validation("body", rejection.body_text()))
    }
}

impl ApiError {
    fn body(&self) -> ErrorBody {
        match self {
            Self::Group(err) => err.to_body(),
            Self::Unauthorized(message) => ErrorBody {
                error: ErrorDetail {
                    code: ErrorCode::Unauthorized,
                    message: (*message).to_string(),
                    field: None,
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        let status = StatusCode::from_u16(body.error.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = ?body.error.code, detail = %body.error.message, "request failed");
        } else {
            debug!(code = ?body.error.code, detail = %body.error.message, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

/// The authenticated caller, taken from `Authorization: Bearer <user-id>`.
#[derive(Debug, Clone)]
pub(crate) struct Caller(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(ApiError::Unauthorized("missing bearer token"))?;
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized("malformed bearer token"))?;
        Ok(Caller(UserId::from(token)))
    }
}

impl<K: GroupEventSink + 'static> AppState<K> {
    /// Runs `f` against the coordinator on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Coordinator<K>) -> GroupResult<T> + Send + 'static,
    {
        let coordinator = self.coordinator.clone();
        let result = tokio::task::spawn_blocking(move || f(&coordinator))
            .await
            .map_err(|e| GroupError::Internal(format!("coordinator task failed: {e}")))?;
        Ok(result?)
    }
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

pub(crate) async fn create_or_match<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(user): Caller,
    body: Result<Json<CreateOrMatchRequest>, JsonRejection>,
) -> Result<Json<CreateOrMatchResponse>, ApiError> {
    let Json(request) = body?;
    let response = state
        .run(move |c| c.create_or_match(&user, &request))
        .await?;
    Ok(Json(response))
}

/// The join body is optional; an empty body joins with no pace or name.
pub(crate) async fn join<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(user): Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<GroupRecord>, ApiError> {
    let request: JoinRequest = if body.iter().all(u8::is_ascii_whitespace) {
        JoinRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| GroupError::validation("body", e.to_string()))?
    };
    let id = GroupId::from(id);
    let record = state.run(move |c| c.join(&id, &user, &request)).await?;
    Ok(Json(record))
}

pub(crate) async fn leave<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(user): Caller,
    Path(id): Path<String>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let id = GroupId::from(id);
    state.run(move |c| c.leave(&id, &user)).await?;
    Ok(Json(LeaveResponse { ok: true }))
}

pub(crate) async fn cancel<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(user): Caller,
    Path(id): Path<String>,
) -> Result<Json<GroupRecord>, ApiError> {
    let id = GroupId::from(id);
    debug!(group_id = %id, user_id = %user, "cancel requested");
    let record = state.run(move |c| c.cancel(&id)).await?;
    Ok(Json(record))
}

pub(crate) async fn group<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(_): Caller,
    Path(id): Path<String>,
) -> Result<Json<GroupRecord>, ApiError> {
    let id = GroupId::from(id);
    let record = state.run(move |c| c.group(&id)).await?;
    Ok(Json(record))
}

pub(crate) async fn upcoming<K: GroupEventSink + 'static>(
    State(state): State<AppState<K>>,
    Caller(_): Caller,
) -> Result<Json<UpcomingGroupsResponse>, ApiError> {
    let groups = state.run(|c| c.upcoming()).await?;
    Ok(Json(UpcomingGroupsResponse { groups }))
}
