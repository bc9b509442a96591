//! Configuration, paths, and logging setup shared by the Runclub binaries.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_LISTEN_ADDR, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_URL};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
