//! Diagnostic logging setup.
//!
//! Logs are an operator side channel; nothing written here is shown in the
//! chat. The full-screen view owns the terminal, so it only logs when a file
//! is given.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "mediquery=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Disabled,
}

impl LogTarget {
    /// Pick a target for a front end: an explicit file always wins; otherwise
    /// stderr when the terminal is free, nothing when it is not.
    pub fn choose(log_file: Option<&Path>, terminal_is_free: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path.to_path_buf()),
            None if terminal_is_free => LogTarget::Stderr,
            None => LogTarget::Disabled,
        }
    }
}

fn open_log_file(path: &Path) -> Result<File, Box<dyn std::error::Error>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("Cannot open log file {}: {err}", path.display()).into())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_tracing(target: &LogTarget) -> Result<(), Box<dyn std::error::Error>> {
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_target(true)
                .try_init();
            Ok(())
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_file_wins() {
        let path = Path::new("/tmp/mediquery.log");
        assert_eq!(
            LogTarget::choose(Some(path), false),
            LogTarget::File(path.to_path_buf())
        );
        assert_eq!(
            LogTarget::choose(Some(path), true),
            LogTarget::File(path.to_path_buf())
        );
    }

    #[test]
    fn busy_terminal_disables_logging() {
        assert_eq!(LogTarget::choose(None, false), LogTarget::Disabled);
        assert_eq!(LogTarget::choose(None, true), LogTarget::Stderr);
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let temp_dir = TempDir::new().expect("temp dir");
        let missing = temp_dir.path().join("missing-dir").join("log.txt");
        let err = init_tracing(&LogTarget::File(missing)).unwrap_err();
        assert!(err.to_string().contains("Cannot open log file"));
    }

    #[test]
    fn log_file_is_created() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("mediquery.log");
        init_tracing(&LogTarget::File(path.clone())).expect("init");
        assert!(path.exists());
    }
}
