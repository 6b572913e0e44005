//! `eventlog current` — the file the next line would be appended to.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use eventlog_core::LoggerConfig;
use eventlog_sink::LogSink;

/// Arguments for `eventlog current`.
#[derive(Args, Debug)]
pub struct CurrentArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CurrentJson {
    path: PathBuf,
    date: NaiveDate,
    sequence: Option<u32>,
    size_bytes: u64,
    exists: bool,
}

impl CurrentArgs {
    pub fn run(self, config: LoggerConfig) -> Result<()> {
        let directory = config.directory.clone();
        let sink = LogSink::open(config)
            .with_context(|| format!("no usable log file in {}", directory.display()))?;
        let handle = sink.current_log_file();

        if !self.json {
            println!("{}", handle.path().display());
            return Ok(());
        }

        let payload = CurrentJson {
            exists: handle.path().is_file(),
            path: handle.path(),
            date: handle.date,
            sequence: handle.sequence,
            size_bytes: handle.size_bytes,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to render JSON")?
        );
        Ok(())
    }
}
