//! Logger configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.eventlog/
//!   config.yaml               (optional; hand-edited)
//!   logs/                     (default log directory, mode 0700 once created)
//!     events_log_<date>.txt
//!     events_log_<date>_<n>.txt
//! ```
//!
//! # API pattern
//!
//! Every function that touches the home directory has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, ConfigError};

/// Tag used when none (or an empty one) is configured.
pub const DEFAULT_TAG: &str = "FileLogger";

/// Default rotation threshold (1 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// What rotation does when a candidate file cannot be stat'ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailurePolicy {
    /// Treat the unreadable candidate as free and use it.
    #[default]
    TreatAsAbsent,
    /// Abandon the rotation and keep appending to the previous file.
    KeepCurrent,
}

/// Resolved logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Directory holding the log files.
    pub directory: PathBuf,
    /// Channel identifier for the console mirror.
    pub tag: String,
    /// A file larger than this is rotated on the next call.
    pub max_file_bytes: u64,
    pub probe_failure: ProbeFailurePolicy,
}

impl LoggerConfig {
    /// Defaults rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            tag: DEFAULT_TAG.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            probe_failure: ProbeFailurePolicy::default(),
        }
    }

    /// Set the tag; empty input falls back to [`DEFAULT_TAG`].
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = normalize_tag(tag.into());
        self
    }

    /// The configured tag, or [`DEFAULT_TAG`] if it is blank.
    pub fn effective_tag(&self) -> &str {
        if self.tag.trim().is_empty() {
            DEFAULT_TAG
        } else {
            &self.tag
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn with_probe_failure(mut self, policy: ProbeFailurePolicy) -> Self {
        self.probe_failure = policy;
        self
    }
}

/// On-disk shape: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    directory: Option<PathBuf>,
    tag: Option<String>,
    max_file_bytes: Option<u64>,
    probe_failure: Option<ProbeFailurePolicy>,
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.eventlog/` — pure, no I/O.
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".eventlog")
}

/// `<home>/.eventlog/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

/// `<home>/.eventlog/logs/` — pure, no I/O.
pub fn logs_dir_at(home: &Path) -> PathBuf {
    root_at(home).join("logs")
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.eventlog/config.yaml`, filling gaps with defaults.
///
/// A missing file yields the defaults. A relative `directory` is resolved
/// against `<home>/.eventlog/`. Returns `ConfigError::Parse` (with path and
/// line context) on malformed YAML.
pub fn load_at(home: &Path) -> Result<LoggerConfig, ConfigError> {
    let path = config_path_at(home);
    let file = if path.exists() {
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_yaml::from_str::<Option<ConfigFile>>(&contents)
            .map_err(|e| ConfigError::Parse { path, source: e })?
            .unwrap_or_default()
    } else {
        ConfigFile::default()
    };

    let directory = match file.directory {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => root_at(home).join(dir),
        None => logs_dir_at(home),
    };

    Ok(LoggerConfig {
        directory,
        tag: normalize_tag(file.tag.unwrap_or_default()),
        max_file_bytes: file.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
        probe_failure: file.probe_failure.unwrap_or_default(),
    })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<LoggerConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn normalize_tag(tag: String) -> String {
    if tag.trim().is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        tag
    }
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
