//! Run summary types.

use crate::batch::IssueResult;
use crate::process::{ReplyOutcome, Reminder, Stage};

/// Summary of a complete triage run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of issues listed and processed.
    pub issues_processed: usize,

    /// Issues whose body is not a recognized release request.
    pub issues_unrecognized: usize,

    /// Issues whose processing stopped with an error.
    pub issues_failed: usize,

    /// Pipeline runs accepted.
    pub pipelines_triggered: usize,

    /// Pipeline runs refused by the service.
    pub pipelines_rejected: usize,

    /// Pipeline triggers that failed and were reported on the issue.
    pub reply_failures: usize,

    /// Issues warned about inactivity.
    pub issues_warned: usize,

    /// Issues closed for inactivity.
    pub issues_closed_inactive: usize,

    /// Issues closed because the release was published.
    pub issues_auto_closed: usize,

    /// Issues requesting a package an earlier issue already requests.
    pub duplicates: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with one issue's result.
    pub fn record_result(&mut self, result: &IssueResult) {
        let process = &result.process;
        self.issues_processed += 1;

        if result.error.is_some() {
            self.issues_failed += 1;
        }
        if process.stage() == Stage::Unrecognized {
            self.issues_unrecognized += 1;
        }

        match process.reply() {
            ReplyOutcome::Triggered => self.pipelines_triggered += 1,
            ReplyOutcome::Rejected => self.pipelines_rejected += 1,
            ReplyOutcome::Failed => self.reply_failures += 1,
            ReplyOutcome::NotAttempted | ReplyOutcome::Skipped => {}
        }

        match process.reminder() {
            Some(Reminder::Warned) => self.issues_warned += 1,
            Some(Reminder::ClosedInactive) => self.issues_closed_inactive += 1,
            None => {}
        }

        if process.auto_closed() {
            self.issues_auto_closed += 1;
        }
        if process.is_duplicate() {
            self.duplicates += 1;
        }
    }

    /// Returns true if any issue failed or a pipeline trigger failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.issues_failed > 0 || self.reply_failures > 0
    }

    /// Returns true if every issue was processed without errors.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
