//! Configuration for the Runclub binaries.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_GROUP_CAPACITY: u32 = 8;

/// Runclub configuration, stored as JSON in `config.json`.
///
/// Missing fields take their defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level or `tracing` filter directive.
    pub log_level: String,
    /// Group service base URL used by the CLI.
    pub server_url: String,
    /// Socket address the server binds.
    pub listen_addr: String,
    /// Upper bound on each remote call, in milliseconds.
    pub request_timeout_ms: u64,
    /// Capacity given to newly created groups.
    pub default_capacity: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            default_capacity: DEFAULT_GROUP_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from `config.json`, falling back to defaults, then
    /// apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(CoreError::io(path))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(CoreError::io(path))
    }

    /// Apply `RUNCLUB_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> CoreResult<()> {
        if let Some(log_level) = var("RUNCLUB_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(url) = var("RUNCLUB_SERVER_URL") {
            self.server_url = url;
        }
        if let Some(addr) = var("RUNCLUB_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(raw) = var("RUNCLUB_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = raw.trim().parse().map_err(|_| {
                CoreError::setting("RUNCLUB_REQUEST_TIMEOUT_MS", format!("not a number: {raw:?}"))
            })?;
        }
        Ok(())
    }

    /// Reject values no binary can run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.server_url()?;
        if self.request_timeout_ms == 0 {
            return Err(CoreError::setting("request_timeout_ms", "must be > 0"));
        }
        if self.default_capacity == 0 {
            return Err(CoreError::setting("default_capacity", "must be > 0"));
        }
        Ok(())
    }

    /// Get the server URL as a parsed URL.
    pub fn server_url(&self) -> CoreResult<Url> {
        Url::parse(&self.server_url).map_err(CoreError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
