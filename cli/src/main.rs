//! CLI for release-triage.
//!
//! Triages open SDK release request issues: advice, reminders, pipeline
//! triggering and closing of published releases, followed by a status report.

use clap::Parser;
use release_triage::{RunSummary, Runner, RunnerConfig, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Release Triage - Process SDK release request issues and write a status report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the triage configuration file.
    #[arg(long, default_value = "triage.toml")]
    config: PathBuf,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,

    /// Log label, comment and close actions instead of applying them.
    #[arg(long)]
    dry_run: bool,

    /// Number of issues processed at the same time (overrides the config file).
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let mut config = RunnerConfig::new(args.config, args.token, args.dry_run);
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Issues processed: {}", summary.issues_processed);
    println!("  Issues unrecognized: {}", summary.issues_unrecognized);
    println!("  Issues failed: {}", summary.issues_failed);
    println!("  Pipelines triggered: {}", summary.pipelines_triggered);
    println!("  Pipelines rejected: {}", summary.pipelines_rejected);
    println!("  Pipeline failures: {}", summary.reply_failures);
    println!("  Inactivity warnings: {}", summary.issues_warned);
    println!("  Closed for inactivity: {}", summary.issues_closed_inactive);
    println!("  Closed as released: {}", summary.issues_auto_closed);
    println!("  Duplicates: {}", summary.duplicates);
}
