//! Runtime directory layout.
//!
//! ```text
//! <base>/                 ~/.runclub unless --base-dir is given
//!   config.json
//!   groups.sqlite         server record store
//!   mirror.sqlite         device mirror
//!   logs/dev.jsonl
//! ```

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

const BASE_DIR_NAME: &str = ".runclub";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Layout rooted at `~/.runclub`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
        Ok(Self::with_base_dir(home.join(BASE_DIR_NAME)))
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `--base-dir` if given, otherwise `~/.runclub`.
    pub fn resolve(base_dir: Option<PathBuf>) -> CoreResult<Self> {
        base_dir.map_or_else(Self::new, |dir| Ok(Self::with_base_dir(dir)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("groups.sqlite")
    }

    pub fn mirror_database_file(&self) -> PathBuf {
        self.base_dir.join("mirror.sqlite")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("dev.jsonl")
    }

    /// Creates the base and log directories. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        let logs = self.logs_dir();
        std::fs::create_dir_all(&logs).map_err(CoreError::io(logs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn files_live_under_the_base_dir() {
        let paths = Paths::with_base_dir("/srv/runclub");
        let base = Path::new("/srv/runclub");

        assert_eq!(paths.base_dir(), base);
        assert_eq!(paths.config_file(), base.join("config.json"));
        assert_eq!(paths.database_file(), base.join("groups.sqlite"));
        assert_eq!(paths.mirror_database_file(), base.join("mirror.sqlite"));
        assert_eq!(paths.log_file(), base.join("logs").join("dev.jsonl"));
    }

    #[test]
    fn explicit_base_dir_wins() {
        let paths = Paths::resolve(Some(PathBuf::from("/srv/runclub"))).unwrap();
        assert_eq!(paths, Paths::with_base_dir("/srv/runclub"));
    }

    #[test]
    fn default_is_dot_runclub_in_home() {
        if let (Ok(paths), Some(home)) = (Paths::resolve(None), dirs::home_dir()) {
            assert_eq!(paths.base_dir(), home.join(".runclub"));
        }
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("runclub"));

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(paths.base_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }

    #[test]
    fn ensure_dirs_reports_the_failing_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let paths = Paths::with_base_dir(&blocker);

        match paths.ensure_dirs() {
            Err(CoreError::Io { path, .. }) => assert_eq!(path, blocker.join("logs")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
