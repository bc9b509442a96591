//! Error taxonomy shared by the coordinator, the HTTP boundary, and the mirror.

use crate::types::GroupId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain error for group operations.
///
/// Idempotent no-ops (duplicate join, redundant leave) are never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    /// Unknown group identifier.
    #[error("group not found: {0}")]
    NotFound(GroupId),

    /// The group is cancelled and accepts no further joins.
    #[error("group cancelled: {0}")]
    Terminal(GroupId),

    /// The group filled up before the caller could join.
    #[error("group is full: {0}")]
    Conflict(GroupId),

    /// Malformed request.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Network failure or timeout at the remote boundary. Retryable.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Storage or protocol failure behind the coordinator.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using GroupError.
pub type GroupResult<T> = Result<T, GroupError>;

impl GroupError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Terminal(_) => ErrorCode::Terminal,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::Transient(_) => ErrorCode::Transient,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Text shown to the runner.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "group no longer exists".to_string(),
            Self::Terminal(_) => "this run was cancelled".to_string(),
            Self::Conflict(_) => "group just filled up, try again".to_string(),
            Self::Validation { message, .. } => message.clone(),
            Self::Transient(_) => "network problem, showing saved data".to_string(),
            Self::Internal(_) => "something went wrong".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Builds the JSON error body sent over HTTP.
    pub fn to_body(&self) -> ErrorBody {
        let (field, message) = match self {
            Self::Validation { field, message } => (Some(field.clone()), message.clone()),
            Self::NotFound(id) | Self::Terminal(id) | Self::Conflict(id) => {
                (None, id.to_string())
            }
            Self::Transient(message) | Self::Internal(message) => (None, message.clone()),
        };
        ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
                field,
            },
        }
    }

    /// Reconstructs the error from an HTTP error body.
    ///
    /// Group-scoped codes carry the group id in `message`.
    pub fn from_body(body: ErrorBody) -> Self {
        let ErrorDetail {
            code,
            message,
            field,
        } = body.error;
        match code {
            ErrorCode::NotFound => Self::NotFound(GroupId::from(message)),
            ErrorCode::Terminal => Self::Terminal(GroupId::from(message)),
            ErrorCode::Conflict => Self::Conflict(GroupId::from(message)),
            ErrorCode::Validation => Self::Validation {
                field: field.unwrap_or_default(),
                message,
            },
            ErrorCode::Unauthorized => Self::Validation {
                field: "authorization".to_string(),
                message,
            },
            ErrorCode::Transient => Self::Transient(message),
            ErrorCode::Internal => Self::Internal(message),
        }
    }
}

/// Machine-readable error code on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Terminal,
    Conflict,
    Validation,
    Unauthorized,
    Transient,
    Internal,
}

impl ErrorCode {
    /// HTTP status the server answers with for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Terminal => 410,
            Self::Conflict => 409,
            Self::Validation => 422,
            Self::Unauthorized => 401,
            Self::Transient => 503,
            Self::Internal => 500,
        }
    }
}

/// JSON error envelope: `{ "error": { "code", "message", "field"? } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_match_taxonomy() {
        let id = GroupId::from("g-1");
        assert_eq!(
            GroupError::NotFound(id.clone()).user_message(),
            "group no longer exists"
        );
        assert_eq!(
            GroupError::Terminal(id.clone()).user_message(),
            "this run was cancelled"
        );
        assert_eq!(
            GroupError::Conflict(id).user_message(),
            "group just filled up, try again"
        );
    }

    #[test]
    fn only_transient_is_retryable() {
        assert!(GroupError::Transient("timeout".into()).is_retryable());
        assert!(!GroupError::Conflict(GroupId::from("g")).is_retryable());
        assert!(!GroupError::validation("kind", "empty").is_retryable());
    }

    #[test]
    fn body_preserves_group_id_and_field() {
        let err = GroupError::Terminal(GroupId::from("g-9"));
        let body = err.to_body();
        assert_eq!(body.error.code, ErrorCode::Terminal);
        assert_eq!(GroupError::from_body(body), err);

        let err = GroupError::validation("pace_min_per_km", "must be positive");
        let json = serde_json::to_string(&err.to_body()).unwrap();
        assert!(json.contains("\"code\":\"validation\""));
        assert!(json.contains("\"field\":\"pace_min_per_km\""));
        let parsed: ErrorBody = serde_json::from_str(&json).unwrap();
        assert_eq!(GroupError::from_body(parsed), err);
    }

    #[test]
    fn unauthorized_maps_to_validation_on_authorization() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: ErrorCode::Unauthorized,
                message: "missing bearer token".into(),
                field: None,
            },
        };
        match GroupError::from_body(body) {
            GroupError::Validation { field, .. } => assert_eq!(field, "authorization"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_statuses() {
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::Terminal.http_status(), 410);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::Validation.http_status(), 422);
        assert_eq!(ErrorCode::Transient.http_status(), 503);
    }
}
