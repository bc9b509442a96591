//! Logging initialization for the Runclub binaries.
//!
//! Every service writes structured JSONL to `<base>/logs/dev.jsonl` through
//! the observability package.

use observability::LogConfig;

use crate::Paths;

/// Initialize logging for `service`.
///
/// `level` is the default filter; `RUST_LOG` overrides it. With
/// `also_stderr`, compact lines are mirrored to stderr as well.
pub fn init_logging(service: &str, level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: service.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}
