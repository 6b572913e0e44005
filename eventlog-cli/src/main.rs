//! eventlog — write to and inspect rotating event log files.
//!
//! # Usage
//!
//! ```text
//! eventlog [--dir <path>] write [--level info|debug|warn|error] [--tag <tag>] <message>
//! eventlog [--dir <path>] current [--json]
//! eventlog [--dir <path>] files [--json]
//! eventlog [--dir <path>] tail [--lines <n>]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventlog_sink::MIRROR_TARGET;

use commands::{current::CurrentArgs, files::FilesArgs, tail::TailArgs, write::WriteArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "eventlog",
    version,
    about = "Append to and inspect date/size rotated event logs",
    long_about = None,
)]
struct Cli {
    /// Log directory; overrides `directory` in ~/.eventlog/config.yaml.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one line to the active log file.
    Write(WriteArgs),

    /// Show the file the next line would go to.
    Current(CurrentArgs),

    /// List log files in the log directory.
    Files(FilesArgs),

    /// Print the last lines of the active log file.
    Tail(TailArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = commands::resolve_config(cli.dir)?;
    match cli.command {
        Commands::Write(args) => args.run(config),
        Commands::Current(args) => args.run(config),
        Commands::Files(args) => args.run(config),
        Commands::Tail(args) => args.run(config),
    }
}

/// Console mirror goes to stderr so stdout stays machine-readable. `RUST_LOG`
/// narrows the crate's own diagnostics, never the mirror.
fn init_tracing() {
    use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let filter = match format!("{MIRROR_TARGET}=debug").parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
