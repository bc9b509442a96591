//! # Observability
//!
//! Centralized logging for Runclub services.
//!
//! Services are log producers only. They call [`init`] or
//! [`init_with_config`] once at startup and use plain `tracing` macros
//! everywhere else.
//!
//! Every service appends structured JSONL to one central file,
//! `~/.runclub/logs/dev.jsonl` by default:
//!
//! - `tail -f ~/.runclub/logs/dev.jsonl | jq` for pretty JSON
//! - `jq 'select(.group_id == "…")'` to follow one group
//!
//! Writes are append-only and flushed per line, so several processes can
//! share the file.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "runclub-server".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! tracing::info!("ready");
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

pub use file_sink::CentralLogWriter;
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every log line.
    pub service_name: String,

    /// Default filter (e.g. "info", "group_lifecycle=debug").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// Custom log file path. Defaults to `~/.runclub/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Central log file location shared by all services.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".runclub").join("logs").join("dev.jsonl"))
}

/// Initialize logging with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// If the log file cannot be opened, logging degrades to stderr only.
/// Calling this when a global subscriber is already installed is a no-op.
pub fn init_with_config(config: LogConfig) {
    file_sink::install(&config);
}

pub use tracing::{debug, error, info, instrument, trace, warn};
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn test_default_log_path_under_runclub() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with(".runclub/logs/dev.jsonl"));
        }
    }
}
