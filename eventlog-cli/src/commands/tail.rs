//! `eventlog tail` — trailing lines of the active log file.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use eventlog_core::LoggerConfig;
use eventlog_sink::LogSink;

/// Arguments for `eventlog tail`.
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Number of trailing lines to show.
    #[arg(long, default_value_t = 100)]
    pub lines: usize,
}

impl TailArgs {
    pub fn run(self, config: LoggerConfig) -> Result<()> {
        let directory = config.directory.clone();
        let sink = LogSink::open(config)
            .with_context(|| format!("no usable log file in {}", directory.display()))?;
        print_tail(&sink.current_log_file().path(), self.lines)
    }
}

fn print_tail(path: &Path, lines: usize) -> Result<()> {
    if !path.exists() {
        println!("log file not found: {}", path.display());
        return Ok(());
    }

    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tail = VecDeque::<String>::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        if tail.len() == lines {
            tail.pop_front();
        }
        if lines > 0 {
            tail.push_back(line);
        }
    }

    println!("==> {} <==", path.display());
    for line in tail {
        println!("{}", highlight_level(&line));
    }
    Ok(())
}

/// Colour the `[LEVEL]` tag of a formatted line.
fn highlight_level(line: &str) -> String {
    for (tag, paint) in [
        ("[ERROR]", "red"),
        ("[WARN]", "yellow"),
        ("[DEBUG]", "blue"),
        ("[INFO]", "green"),
    ] {
        if let Some((head, rest)) = line.split_once(tag) {
            return format!("{head}{}{rest}", tag.color(paint));
        }
    }
    line.to_string()
}
