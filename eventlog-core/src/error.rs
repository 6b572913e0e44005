//! Error types for eventlog-core.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the file side of a log call.
///
/// None of these ever reach the caller of `LogSink::log`; they are reported
/// on the console mirror only.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log directory could not be created or is not a directory.
    #[error("log directory unavailable at {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening the target file for append failed.
    #[error("failed to open log file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing the line failed.
    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A candidate file could not be stat'ed during rotation.
    #[error("failed to probe log file {path}: {source}")]
    RotationProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every suffix up to the search cap is already taken.
    #[error("no free log file suffix for {date} (searched up to {limit})")]
    SuffixExhausted { date: NaiveDate, limit: u32 },
}

/// All errors that can arise while loading [`crate::LoggerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
