//! Console mirror: every line also goes to the host's diagnostic channel.

use std::sync::{Mutex, PoisonError};

use eventlog_core::LogLevel;

/// Secondary output for every log line. Must not fail and must not block on
/// the file path.
pub trait ConsoleSink: Send + Sync {
    /// `line` is the formatted record without its trailing newline.
    fn write(&self, tag: &str, level: LogLevel, line: &str);
}

/// `tracing` target of mirrored lines. Subscribers enable it at `debug` so
/// every level of the mirror gets through.
pub const MIRROR_TARGET: &str = "eventlog::mirror";

/// Emits each line as a `tracing` event at the matching level, under
/// [`MIRROR_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn write(&self, tag: &str, level: LogLevel, line: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: MIRROR_TARGET, tag = %tag, "{line}"),
            LogLevel::Info => tracing::info!(target: MIRROR_TARGET, tag = %tag, "{line}"),
            LogLevel::Warn => tracing::warn!(target: MIRROR_TARGET, tag = %tag, "{line}"),
            LogLevel::Error => tracing::error!(target: MIRROR_TARGET, tag = %tag, "{line}"),
        }
    }
}

/// One line captured by [`MemoryConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub tag: String,
    pub level: LogLevel,
    pub line: String,
}

/// Keeps every mirrored line in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured lines at [`LogLevel::Warn`].
    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.level == LogLevel::Warn)
            .map(|l| l.line)
            .collect()
    }
}

impl ConsoleSink for MemoryConsole {
    fn write(&self, tag: &str, level: LogLevel, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ConsoleLine {
                tag: tag.to_string(),
                level,
                line: line.to_string(),
            });
    }
}
