//! Batch orchestration.
//!
//! Lists the open release requests, runs one [`IssueProcess`] per issue and
//! applies the cross-issue duplicate check once every issue has finished.

use crate::process::{IssuePackage, IssueProcess, ProcessContext, ProcessError};
use crate::report::ReportRow;
use crate::summary::RunSummary;
use crate::tracker::{Issue, IssueFilter, TrackerError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{error, info, info_span, Instrument};

/// Advice prepended to issues requesting an already requested package.
pub const DUPLICATE_MARKER: &str = "duplicated issue";

/// Outcome of processing one issue.
#[derive(Debug)]
pub struct IssueResult {
    /// Final working state, also when processing failed part way.
    pub process: IssueProcess,
    /// Error that stopped processing, if any.
    pub error: Option<ProcessError>,
}

impl IssueResult {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Results of one batch run, in listing order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<IssueResult>,
    pub summary: RunSummary,
}

impl BatchOutcome {
    /// Report rows in listing order.
    #[must_use]
    pub fn report_rows(&self) -> Vec<ReportRow> {
        self.results
            .iter()
            .map(|result| ReportRow::from(&result.process))
            .collect()
    }
}

/// Drives every open release request through its [`IssueProcess`].
pub struct Batch<'a> {
    ctx: ProcessContext<'a>,
}

impl<'a> Batch<'a> {
    #[must_use]
    pub fn new(ctx: ProcessContext<'a>) -> Self {
        Self { ctx }
    }

    /// Lists open issues and processes them.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] only if the issues cannot be listed. Failures
    /// of individual issues are recorded in their [`IssueResult`].
    pub async fn run(&self) -> Result<BatchOutcome, TrackerError> {
        self.run_at(Utc::now()).await
    }

    /// Same as [`Batch::run`] with an explicit current time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] only if the issues cannot be listed.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<BatchOutcome, TrackerError> {
        let config = self.ctx.config;
        let filter = IssueFilter {
            repository: config.repository.clone(),
            labels: config.filter_labels.clone(),
        };
        let issues = self.ctx.tracker.list_open_issues(&filter).await?;
        info!(
            repository = %config.repository,
            count = issues.len(),
            ecosystem = self.ctx.ecosystem.name(),
            "Found open release requests"
        );

        Ok(self.process_issues(issues, now).await)
    }

    /// Processes already listed issues. Results keep the input order even
    /// when several issues run at once.
    pub async fn process_issues(&self, issues: Vec<Issue>, now: DateTime<Utc>) -> BatchOutcome {
        let concurrency = self.ctx.config.concurrency.max(1);
        let mut results: Vec<IssueResult> = stream::iter(issues)
            .map(|issue| {
                let span = info_span!("issue", number = issue.number);
                self.process_issue(issue, now).instrument(span)
            })
            .buffered(concurrency)
            .collect()
            .await;

        duplicated_policy(&mut results);

        let mut summary = RunSummary::new(self.ctx.dry_run);
        for result in &results {
            summary.record_result(result);
        }
        BatchOutcome { results, summary }
    }

    async fn process_issue(&self, issue: Issue, now: DateTime<Utc>) -> IssueResult {
        let config = self.ctx.config;
        let number = issue.number;
        let comments = self.ctx.tracker.comments(&config.repository, number).await;
        let package = IssuePackage::new(
            issue,
            config.repository.clone(),
            config.spec_repository.clone(),
            &config.labels,
        );

        let comments = match comments {
            Ok(comments) => comments,
            Err(e) => {
                error!(issue = number, error = %e, "Failed to fetch comments");
                return IssueResult {
                    process: IssueProcess::new(package, &[], &config.owners, now),
                    error: Some(e.into()),
                };
            }
        };

        let mut process = IssueProcess::new(package, &comments, &config.owners, now);
        let error = match process.run(&self.ctx).await {
            Ok(()) => None,
            Err(e) => {
                error!(issue = number, error = %e, "Failed to process issue");
                Some(e)
            }
        };
        IssueResult { process, error }
    }
}

/// Marks every issue whose package was already requested by an earlier issue.
pub fn duplicated_policy(results: &mut [IssueResult]) {
    let mut seen = HashSet::new();
    for result in results.iter_mut() {
        let Some(package) = result.process.package_name() else {
            continue;
        };
        if !seen.insert(package.to_string()) {
            info!(issue = result.process.number(), package = %package, "Duplicated release request");
            result.process.mark_duplicate(DUPLICATE_MARKER);
        }
    }
}

#[cfg(test)]
mod tests;
