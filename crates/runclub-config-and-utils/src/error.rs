use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading configuration or preparing the runtime directory.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid setting {key}: {reason}")]
    Setting { key: &'static str, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server_url is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("home directory not found, pass --base-dir")]
    NoHomeDir,
}

impl CoreError {
    pub(crate) fn setting(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Setting {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
