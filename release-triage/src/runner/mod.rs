//! Wires configuration and service clients into a triage run.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::batch::Batch;
use crate::config::TriageConfig;
use crate::ecosystem::Python;
use crate::index::PyPiIndex;
use crate::ledger::CsvLedger;
use crate::pipeline::DevOpsPipeline;
use crate::process::ProcessContext;
use crate::report::render_report;
use crate::summary::RunSummary;
use crate::tracker::GitHubTracker;
use octocrab::Octocrab;
use tracing::{info, warn};

/// Runs one triage pass over the Python release request queue.
pub struct Runner {
    config: RunnerConfig,
    triage: TriageConfig,
    tracker: GitHubTracker,
    pipeline: DevOpsPipeline,
    index: PyPiIndex,
    ledger: CsvLedger,
}

impl Runner {
    /// Loads the triage configuration and builds the service clients.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the configuration is invalid or a client
    /// cannot be constructed.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let mut triage = TriageConfig::load(config.config_path())?;
        if let Some(concurrency) = config.concurrency() {
            triage.concurrency = concurrency;
            triage.validate(config.config_path())?;
        }

        let timeout = triage.timeout();
        let octocrab = Octocrab::builder()
            .personal_token(config.token().to_string())
            .build()?;
        let pipeline_token = triage.pipeline.token();
        if pipeline_token.is_none() {
            warn!(
                env = %triage.pipeline.token_env,
                "No pipeline token set; pipeline runs will be unauthenticated"
            );
        }

        Ok(Self {
            tracker: GitHubTracker::new(octocrab, timeout),
            pipeline: DevOpsPipeline::new(pipeline_token, timeout)?,
            index: PyPiIndex::new(&triage.index.base_url, timeout)?,
            ledger: CsvLedger::new(triage.ledger_file.clone()),
            triage,
            config,
        })
    }

    /// Processes every open release request and writes the status report.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the release requests cannot be listed or the
    /// report cannot be rendered. A report that cannot be written is logged.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        if self.config.dry_run() {
            info!("Dry run: no issue, pipeline or ledger changes will be made");
        }

        let ctx = ProcessContext {
            tracker: &self.tracker,
            pipeline: &self.pipeline,
            index: &self.index,
            ledger: &self.ledger,
            ecosystem: &Python,
            config: &self.triage,
            dry_run: self.config.dry_run(),
        };
        let outcome = Batch::new(ctx).run().await?;

        let report = render_report(&outcome.report_rows())?;
        let path = &self.triage.report_file;
        match tokio::fs::write(path, report).await {
            Ok(()) => info!(path = %path.display(), "Wrote status report"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write status report"),
        }

        Ok(outcome.summary)
    }
}
