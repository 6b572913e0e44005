//! # eventlog-sink
//!
//! Rotating file logger: one dated file per day, split by size, append-only.
//!
//! ```rust,no_run
//! use eventlog_core::LoggerConfig;
//! use eventlog_sink::LogSink;
//!
//! fn boot() {
//!     if let Ok(sink) = LogSink::open(LoggerConfig::new("/var/lib/app/logs").with_tag("BootWorker")) {
//!         sink.log_info("boot completed");
//!         println!("logging to {}", sink.current_log_file());
//!     }
//! }
//! ```
//!
//! Host facilities are injected: [`FileStore`], [`ConsoleSink`] and [`Clock`].

pub mod clock;
pub mod console;
pub mod rotation;
pub mod sink;
pub mod store;
pub mod writer;

pub use clock::{Clock, LocalClock, ManualClock};
pub use console::{ConsoleLine, ConsoleSink, MemoryConsole, TracingConsole, MIRROR_TARGET};
pub use rotation::{list_log_files, Decision, RotationPolicy, MAX_SUFFIX};
pub use sink::{LogSink, LogSinkBuilder};
pub use store::{FileStore, FsStore, MemoryStore};
pub use writer::LogWriter;
