//! codemap CLI entry point.
//!
//! A single command per the external-interface contract: point it at a
//! directory, it re-indexes that project into its store and exits. Every
//! other capability (summaries, call-stack traversal, impact analysis,
//! dependency/reference/signature queries, the watcher) is a library surface
//! consumed by an agent host, not something this binary exposes directly.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "Re-index a project's code-intelligence graph", long_about = None)]
struct Cli {
    /// Project directory to index (defaults to the current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("codemap={log_level}")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match commands::reindex(&cli.root) {
        Ok(report) => {
            tracing::info!(
                files_indexed = report.files_indexed,
                diagnostics = report.diagnostics.len(),
                "reindex complete"
            );
            for (path, message) in &report.diagnostics {
                tracing::warn!(file = %path, %message, "extraction diagnostic");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "reindex failed");
            ExitCode::FAILURE
        }
    }
}
