//! Domain types for the event log.
//!
//! All path fields use `PathBuf`. A [`LogFileHandle`] is a value: rotation
//! replaces it wholesale, only `size_bytes` is refreshed after an append.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// File name prefix shared by every log file.
pub const FILE_PREFIX: &str = "events_log";

/// File extension of every log file (without the dot).
pub const FILE_EXTENSION: &str = "txt";

/// `chrono` format of the date stamp embedded in file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `chrono` format of the per-line timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Severity of a log line. Rendered in upper case inside the brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Warn,
    Error,
}

impl LogLevel {
    pub fn all() -> &'static [LogLevel] {
        &[LogLevel::Info, LogLevel::Debug, LogLevel::Warn, LogLevel::Error]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level '{other}'; expected: info, debug, warn, error"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One log call, alive only while it is formatted and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub message: &'a str,
    /// Console channel the record is mirrored under. Not part of the line.
    pub tag: &'a str,
}

impl LogRecord<'_> {
    /// `<YYYY-MM-DD HH:MM:SS> [<LEVEL>] <message>\n`
    ///
    /// Line breaks inside `message` are written as `\n` / `\r` so every record
    /// stays on one physical line.
    pub fn to_line(&self) -> String {
        format!(
            "{} [{}] {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            escape_line_breaks(self.message)
        )
    }
}

fn escape_line_breaks(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r']) {
        Cow::Owned(message.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(message)
    }
}

// ---------------------------------------------------------------------------
// File handle
// ---------------------------------------------------------------------------

/// Identity of one log file: `<dir>/events_log_<date>[_<n>].txt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogFileHandle {
    pub directory: PathBuf,
    pub date: NaiveDate,
    /// `None` for the plain dated file, `Some(n)` with `n >= 1` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    /// Last observed length of the file in bytes.
    pub size_bytes: u64,
}

impl LogFileHandle {
    pub fn new(directory: impl Into<PathBuf>, date: NaiveDate, sequence: Option<u32>) -> Self {
        Self {
            directory: directory.into(),
            date,
            sequence,
            size_bytes: 0,
        }
    }

    /// `YYYY-MM-DD` stamp embedded in the file name.
    pub fn date_stamp(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn file_name(&self) -> String {
        file_name_for(self.date, self.sequence)
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(self.file_name())
    }

    /// True if this file was opened on `date`.
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    /// Parse a file name produced by [`file_name_for`] back into a handle
    /// rooted at `directory`. Returns `None` for unrelated names.
    pub fn parse(directory: &Path, file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_prefix(FILE_PREFIX)?
            .strip_prefix('_')?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?;

        let (date_part, sequence) = match stem.split_once('_') {
            Some((date, n)) => {
                // Suffixes start at 1 and are never zero-padded.
                if n.starts_with('0') || !n.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (date, Some(n.parse::<u32>().ok()?))
            }
            None => (stem, None),
        };

        // Reject non-canonical stamps like `2024-1-1`.
        if date_part.len() != 10 {
            return None;
        }
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()?;
        Some(Self::new(directory, date, sequence))
    }
}

impl fmt::Display for LogFileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path().display().fmt(f)
    }
}

/// `events_log_<date>.txt` or `events_log_<date>_<n>.txt`.
pub fn file_name_for(date: NaiveDate, sequence: Option<u32>) -> String {
    let stamp = date.format(DATE_FORMAT);
    match sequence {
        Some(n) => format!("{FILE_PREFIX}_{stamp}_{n}.{FILE_EXTENSION}"),
        None => format!("{FILE_PREFIX}_{stamp}.{FILE_EXTENSION}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
