//! `eventlog write` — append one line through the rotating sink.

use anyhow::{Context, Result};
use clap::Args;

use eventlog_core::{LogLevel, LoggerConfig};
use eventlog_sink::LogSink;

/// Arguments for `eventlog write`.
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Message text (joined with spaces).
    #[arg(required = true)]
    pub message: Vec<String>,

    /// info, debug, warn or error.
    #[arg(long, default_value = "info")]
    pub level: LogLevel,

    /// Console channel tag.
    #[arg(long)]
    pub tag: Option<String>,
}

impl WriteArgs {
    pub fn run(self, mut config: LoggerConfig) -> Result<()> {
        if let Some(tag) = self.tag {
            config = config.with_tag(tag);
        }
        let directory = config.directory.clone();
        let sink = LogSink::open(config)
            .with_context(|| format!("no usable log file in {}", directory.display()))?;
        sink.log(self.level, &self.message.join(" "));
        Ok(())
    }
}
