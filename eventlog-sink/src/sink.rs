//! The logging façade.
//!
//! Every call is mirrored to the console first, then the timestamp, the
//! rotation decision and the append are taken under one lock so no write ever
//! lands in a file another thread has already rotated away from. Failures
//! never reach the caller.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventlog_core::{LogError, LogFileHandle, LogLevel, LogRecord, LoggerConfig};

use crate::clock::{Clock, LocalClock};
use crate::console::{ConsoleSink, TracingConsole};
use crate::rotation::RotationPolicy;
use crate::store::{FileStore, FsStore};
use crate::writer::LogWriter;

/// Rotating file logger bound to one directory.
pub struct LogSink {
    tag: String,
    directory: PathBuf,
    policy: RotationPolicy,
    store: Arc<dyn FileStore>,
    writer: LogWriter,
    console: Arc<dyn ConsoleSink>,
    clock: Arc<dyn Clock>,
    current: Mutex<LogFileHandle>,
}

/// Wires the host capabilities into a [`LogSink`]. Defaults are the real
/// filesystem, the `tracing` console and the local clock.
pub struct LogSinkBuilder {
    config: LoggerConfig,
    store: Arc<dyn FileStore>,
    console: Arc<dyn ConsoleSink>,
    clock: Arc<dyn Clock>,
    policy: Option<RotationPolicy>,
}

impl LogSinkBuilder {
    pub fn store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.store = store;
        self
    }

    pub fn console(mut self, console: Arc<dyn ConsoleSink>) -> Self {
        self.console = console;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the policy derived from the config.
    pub fn policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Acquire the initial file and build the sink.
    ///
    /// # Errors
    /// Fails only when no initial file can be chosen (see
    /// [`RotationPolicy::decide`]). Nothing is written yet.
    pub fn open(self) -> Result<LogSink, LogError> {
        let LogSinkBuilder {
            config,
            store,
            console,
            clock,
            policy,
        } = self;
        let policy = policy.unwrap_or_else(|| RotationPolicy::from_config(&config));
        let tag = config.effective_tag().to_string();

        let today = clock.now().date();
        let decision = policy.decide(store.as_ref(), &config.directory, None, today)?;
        for failure in &decision.probe_failures {
            warn_probe_failure(console.as_ref(), &tag, failure);
        }
        tracing::debug!(path = %decision.handle, "log file acquired");

        Ok(LogSink {
            tag,
            directory: config.directory,
            policy,
            writer: LogWriter::new(store.clone()),
            store,
            console,
            clock,
            current: Mutex::new(decision.handle),
        })
    }
}

impl LogSink {
    pub fn builder(config: LoggerConfig) -> LogSinkBuilder {
        LogSinkBuilder {
            config,
            store: Arc::new(FsStore),
            console: Arc::new(TracingConsole),
            clock: Arc::new(LocalClock),
            policy: None,
        }
    }

    /// Open a sink on the real filesystem with the default capabilities.
    pub fn open(config: LoggerConfig) -> Result<Self, LogError> {
        Self::builder(config).open()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Write one line at `level`. Never fails; file errors are reported on the
    /// console only.
    pub fn log(&self, level: LogLevel, message: &str) {
        let mirrored = self.record(level, message);
        // Mirror before touching the file lock.
        self.console.write(
            mirrored.tag,
            level,
            mirrored.to_line().trim_end_matches('\n'),
        );

        let mut current = self.lock_current();
        // Stamp again under the lock: a time read before waiting may name a day
        // the active file has already moved past.
        let record = self.record(level, message);
        self.rotate_if_needed(&mut current, record.timestamp.date());
        if let Err(err) = self.writer.append(&mut current, &record.to_line()) {
            self.console.write(
                record.tag,
                LogLevel::Warn,
                &format!("failed to write log to file: {err}"),
            );
        }
    }

    pub fn log_info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn log_warning(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn log_error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// The active file as of the last completed rotation decision.
    pub fn current_log_file(&self) -> LogFileHandle {
        self.lock_current().clone()
    }

    fn rotate_if_needed(&self, current: &mut LogFileHandle, today: chrono::NaiveDate) {
        match self
            .policy
            .decide(self.store.as_ref(), &self.directory, Some(&*current), today)
        {
            Ok(decision) => {
                for failure in &decision.probe_failures {
                    warn_probe_failure(self.console.as_ref(), &self.tag, failure);
                }
                if decision.rotated {
                    tracing::debug!(from = %current, to = %decision.handle, "log file rotated");
                    *current = decision.handle;
                }
            }
            Err(err) => {
                self.console.write(
                    &self.tag,
                    LogLevel::Warn,
                    &format!("log rotation failed, still appending to {current}: {err}"),
                );
            }
        }
    }

    fn record<'a>(&'a self, level: LogLevel, message: &'a str) -> LogRecord<'a> {
        LogRecord {
            timestamp: self.clock.now(),
            level,
            message,
            tag: &self.tag,
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, LogFileHandle> {
        // A panic mid-write leaves the handle valid; keep logging.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("tag", &self.tag)
            .field("directory", &self.directory)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn warn_probe_failure(console: &dyn ConsoleSink, tag: &str, failure: &LogError) {
    console.write(
        tag,
        LogLevel::Warn,
        &format!("treating unreadable log file as absent: {failure}"),
    );
}

// ─── Tests ────────────────────────────────────────────────────────────────────
