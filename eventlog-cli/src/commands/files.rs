//! `eventlog files` — every log file in the directory, oldest first.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use eventlog_core::LoggerConfig;
use eventlog_sink::{list_log_files, FsStore};

/// Arguments for `eventlog files`.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FileJson {
    name: String,
    date: String,
    sequence: Option<u32>,
    size_bytes: u64,
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "file")]
    name: String,
    #[tabled(rename = "date")]
    date: String,
    #[tabled(rename = "size")]
    size: String,
}

impl FilesArgs {
    pub fn run(self, config: LoggerConfig) -> Result<()> {
        let files = list_log_files(&FsStore, &config.directory)
            .with_context(|| format!("failed to list {}", config.directory.display()))?;

        if self.json {
            let payload: Vec<FileJson> = files
                .iter()
                .map(|h| FileJson {
                    name: h.file_name(),
                    date: h.date_stamp(),
                    sequence: h.sequence,
                    size_bytes: h.size_bytes,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to render JSON")?
            );
            return Ok(());
        }

        if files.is_empty() {
            println!("No log files in {}.", config.directory.display());
            return Ok(());
        }

        let rows: Vec<FileRow> = files
            .iter()
            .map(|h| FileRow {
                name: h.file_name(),
                date: h.date_stamp(),
                size: format_size(h.size_bytes, config.max_file_bytes),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

/// Human-readable size, red once it is past the rotation threshold.
fn format_size(bytes: u64, max_file_bytes: u64) -> String {
    let text = if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    };
    if bytes > max_file_bytes {
        text.red().to_string()
    } else {
        text
    }
}
