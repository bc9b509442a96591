//! Error types for the HTTP group client.

use group_types::{ErrorBody, GroupError};
use thiserror::Error;

/// Failures talking to the group service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure from reqwest: connect, timeout, TLS, or body decode.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("group service error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Invalid base URL or other setup problem.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ServiceError> for GroupError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                GroupError::Transient(e.to_string())
            }
            ServiceError::Http(e) => GroupError::Internal(e.to_string()),
            ServiceError::Api { status, body } => match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => GroupError::from_body(parsed),
                // Proxies and load balancers answer without our envelope.
                Err(_) if status >= 500 => GroupError::Transient(format!("{status}: {body}")),
                Err(_) => GroupError::Internal(format!("{status}: {body}")),
            },
            ServiceError::Config(message) => GroupError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use group_types::GroupId;

    #[test]
    fn api_error_with_envelope_keeps_taxonomy() {
        let body = GroupError::Conflict(GroupId::from("g-1")).to_body();
        let err = ServiceError::Api {
            status: 409,
            body: serde_json::to_string(&body).unwrap(),
        };
        assert_eq!(GroupError::from(err), GroupError::Conflict(GroupId::from("g-1")));
    }

    #[test]
    fn bare_gateway_error_is_transient() {
        let err = ServiceError::Api {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert!(GroupError::from(err).is_retryable());
    }

    #[test]
    fn bare_client_error_is_internal() {
        let err = ServiceError::Api {
            status: 400,
            body: "nope".to_string(),
        };
        assert!(matches!(GroupError::from(err), GroupError::Internal(_)));
    }
}
