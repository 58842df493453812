//! Tracing subscriber initialization.
//!
//! Diagnostics from both utility chains (skipped override candidates,
//! dropped tool_use blocks, absorbed settings errors) go through `tracing`.
//! The host initializes a file-backed subscriber once at activation; tests
//! and alternate hosts may install their own subscriber instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create the log directory
    #[error("failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log path has no file name or parent directory component
    #[error("invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// A global subscriber was already installed
    #[error("tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Default log file location under the platform state directory.
///
/// Falls back to the current directory when no state directory exists.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("ccbridge").join("ccbridge.log"),
        None => PathBuf::from("ccbridge.log"),
    }
}

/// Install a file-backed tracing subscriber.
///
/// Creates the log directory if missing. Respects `RUST_LOG`, defaulting
/// to `info`. ANSI colors are disabled since output goes to a file.
///
/// # Errors
///
/// Fails when the directory cannot be created, the path has no file name,
/// or a global subscriber is already set.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;
    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn default_log_path_names_the_crate() {
        let path = default_log_path();
        assert!(path.to_string_lossy().ends_with("ccbridge.log"));
    }

    #[test]
    #[serial(tracing_init)]
    fn init_creates_missing_log_directory() {
        let temp = TempDir::new().expect("temp dir");
        let log_file = temp.path().join("logs").join("ccbridge.log");

        // Subscriber may already be installed by another test; the
        // directory is created either way.
        let _ = init(&log_file);

        assert!(log_file.parent().expect("has parent").exists());
    }

    #[test]
    #[serial(tracing_init)]
    fn init_rejects_path_without_file_name() {
        let result = init(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }
}
