//! eventlog core library — domain types, configuration, errors.
//!
//! - [`types`] — levels, records, and the [`LogFileHandle`] naming scheme
//! - [`error`] — [`LogError`] and [`ConfigError`]
//! - [`config`] — [`LoggerConfig`] loading

pub mod config;
pub mod error;
pub mod types;

pub use config::{LoggerConfig, ProbeFailurePolicy};
pub use error::{ConfigError, LogError};
pub use types::{file_name_for, LogFileHandle, LogLevel, LogRecord};
