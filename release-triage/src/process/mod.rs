//! Per-issue processing.
//!
//! An [`IssueProcess`] walks one release request through four stages:
//!
//! 1. parse the issue body and the ecosystem's companion metadata,
//! 2. evaluate the ecosystem's policies (advice, reminders),
//! 3. trigger the release pipeline when the request is ready,
//! 4. close the issue once the requested package has been published.
//!
//! Stages queue tracker mutations as [`Intent`]s which are applied at the end
//! of each stage, or only logged in dry-run mode.

mod error;
pub(crate) mod fields;
mod package;

pub use error::ProcessError;
pub use package::IssuePackage;

use crate::config::TriageConfig;
use crate::ecosystem::Ecosystem;
use crate::index::PackageIndex;
use crate::labels::{Label, LabelSet};
use crate::ledger::{CsvLedger, LedgerEntry};
use crate::pipeline::{PipelineError, PipelineRequest, PipelineTrigger};
use crate::tracker::{Comment, IssueTracker};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Collaborators and settings shared by every issue of a run.
pub struct ProcessContext<'a> {
    pub tracker: &'a dyn IssueTracker,
    pub pipeline: &'a dyn PipelineTrigger,
    pub index: &'a dyn PackageIndex,
    pub ledger: &'a CsvLedger,
    pub ecosystem: &'a dyn Ecosystem,
    pub config: &'a TriageConfig,
    /// Log mutations instead of applying them.
    pub dry_run: bool,
}

/// A pending tracker mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddLabel(Label),
    RemoveLabel(Label),
    Comment(String),
    Close,
    Assign(String),
}

/// How far processing of an issue got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Created,
    /// The body does not reference a recognized specification; nothing else runs.
    Unrecognized,
    Parsed,
    Advised,
    Replied,
    Finished,
}

/// Outcome of the pipeline trigger stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The stage did not run.
    NotAttempted,
    /// The request was already handed over, or its readme needs configuring.
    Skipped,
    /// The pipeline accepted the run.
    Triggered,
    /// The pipeline service refused the run.
    Rejected,
    /// The trigger failed; the assignee was told.
    Failed,
}

/// Inactivity escalation applied during this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    Warned,
    ClosedInactive,
}

/// Working state for one issue during one run.
#[derive(Debug, Clone)]
pub struct IssueProcess {
    package: IssuePackage,
    labels: LabelSet,
    owner: String,
    assignee: String,
    readme_link: String,
    target_tag: String,
    spec_hash: String,
    target_date: Option<NaiveDate>,
    package_name: Option<String>,
    output_folder: Option<String>,
    delay_time: i64,
    date_from_target: Option<i64>,
    today: NaiveDate,
    bot_advice: Vec<String>,
    is_open: bool,
    stage: Stage,
    reply: ReplyOutcome,
    reminder: Option<Reminder>,
    auto_closed: bool,
    duplicate: bool,
    intents: Vec<Intent>,
}

impl IssueProcess {
    /// Creates the working state and fixes the issue's delay time.
    ///
    /// The delay counts whole days since the later of the issue's creation and
    /// its most recent comment by someone outside `owners`.
    pub fn new(
        package: IssuePackage,
        comments: &[Comment],
        owners: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let created_at = package.issue.created_at;
        let last_activity = comments
            .iter()
            .filter(|comment| !owners.contains(&comment.author))
            .map(|comment| comment.updated_at)
            .max()
            .map_or(created_at, |latest| latest.max(created_at));
        let delay_time = (now - last_activity).num_days().max(0);

        Self {
            labels: package.labels.clone(),
            owner: package.issue.author.clone(),
            assignee: package.issue.author.clone(),
            package,
            readme_link: String::new(),
            target_tag: String::new(),
            spec_hash: String::new(),
            target_date: None,
            package_name: None,
            output_folder: None,
            delay_time,
            date_from_target: None,
            today: now.date_naive(),
            bot_advice: Vec::new(),
            is_open: true,
            stage: Stage::Created,
            reply: ReplyOutcome::NotAttempted,
            reminder: None,
            auto_closed: false,
            duplicate: false,
            intents: Vec::new(),
        }
    }

    /// Runs every stage in order. Returns early, without touching the
    /// tracker, when the body is not a recognized release request. An issue
    /// closed for inactivity skips the reply and close stages but still loses
    /// its `Configured` label.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] when a tracker call, the companion metadata or
    /// the ledger fails. Mutations queued before the failure may have been
    /// applied.
    pub async fn run(&mut self, ctx: &ProcessContext<'_>) -> Result<(), ProcessError> {
        if !self.auto_parse(ctx).await? {
            return Ok(());
        }
        self.flush(ctx).await?;

        self.auto_bot_advice(ctx.ecosystem);
        self.flush(ctx).await?;

        if self.is_open {
            self.auto_reply(ctx).await?;
            self.auto_close(ctx).await?;
        } else {
            self.remove_label(Label::Configured);
            self.flush(ctx).await?;
        }
        self.stage = Stage::Finished;
        Ok(())
    }

    /// Parses the issue body and companion metadata.
    ///
    /// Returns `false` if the body does not point into the specification
    /// repository's resource-manager tree.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if the companion file cannot be read or lacks
    /// required settings.
    pub async fn auto_parse(&mut self, ctx: &ProcessContext<'_>) -> Result<bool, ProcessError> {
        let issue = &self.package.issue;
        let lines = issue.body_lines();
        let link = fields::readme_link(lines.first().copied().unwrap_or_default());
        let Some(spec_path) = fields::resource_manager_path(&link, &self.package.spec_repository)
        else {
            info!(issue = issue.number, "Body does not reference a resource-manager specification");
            self.stage = Stage::Unrecognized;
            return Ok(false);
        };

        let header = &lines[..lines.len().min(fields::HEADER_LINES)];
        let spec_hash = fields::field(header, fields::HASH_FIELD).unwrap_or_default();
        let target_tag = fields::field(header, fields::TAG_FIELD).unwrap_or_default();
        let target_date = fields::field(&lines, fields::TARGET_DATE_FIELD)
            .and_then(|value| fields::target_date(&value));

        let companion_path = format!("{spec_path}/{}", ctx.ecosystem.companion_file());
        let contents = ctx
            .tracker
            .file_contents(&self.package.spec_repository, &companion_path)
            .await?;
        let companion = ctx.ecosystem.read_companion(&contents)?;

        self.readme_link = link;
        self.spec_hash = spec_hash;
        self.target_tag = target_tag;
        self.target_date = target_date;
        self.date_from_target = target_date.map(|date| (date - self.today).num_days());
        self.package_name = Some(companion.package_name);
        self.output_folder = Some(companion.output_folder);
        if companion.multi_api {
            self.add_label(Label::MultiApi);
        }
        self.resolve_assignee(&ctx.config.assignees);

        debug!(
            issue = self.number(),
            package = ?self.package_name,
            tag = %self.target_tag,
            delay = self.delay_time,
            "Parsed release request"
        );
        self.stage = Stage::Parsed;
        Ok(true)
    }

    /// Evaluates the ecosystem's policies in order.
    pub fn auto_bot_advice(&mut self, ecosystem: &dyn Ecosystem) {
        for policy in ecosystem.policies() {
            policy.apply(self);
        }
        self.stage = Stage::Advised;
    }

    /// Triggers the release pipeline when the request is ready for it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if applying the resulting label or comment fails.
    pub async fn auto_reply(&mut self, ctx: &ProcessContext<'_>) -> Result<(), ProcessError> {
        let configured = self.has_label(Label::Configured);

        self.reply = if self.has_label(Label::AutoAskCheck) && !configured {
            ReplyOutcome::Skipped
        } else if self.readme_needs_change(ctx).await {
            info!(issue = self.number(), "Readme needs configuring before release");
            ReplyOutcome::Skipped
        } else {
            match self.trigger_pipeline(ctx).await {
                Ok(true) => {
                    info!(issue = self.number(), "Pipeline run queued");
                    self.add_label(Label::AutoAskCheck);
                    ReplyOutcome::Triggered
                }
                Ok(false) => {
                    warn!(issue = self.number(), "Pipeline run refused");
                    ReplyOutcome::Rejected
                }
                Err(e) => {
                    warn!(issue = self.number(), error = %e, "Pipeline trigger failed");
                    self.comment(format!(
                        "hi @{}, please check release-helper: `{e}`",
                        self.assignee
                    ));
                    ReplyOutcome::Failed
                }
            }
        };

        if configured {
            self.remove_label(Label::Configured);
        }
        self.stage = Stage::Replied;
        self.flush(ctx).await
    }

    /// Closes the issue once the requested package has been published after
    /// the issue was opened. Does nothing if it was already auto-closed.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if the tracker or the ledger write fails.
    pub async fn auto_close(&mut self, ctx: &ProcessContext<'_>) -> Result<(), ProcessError> {
        if self.has_label(Label::AutoClosed) {
            return Ok(());
        }
        let Some(package_name) = self.package_name.clone() else {
            return Ok(());
        };

        let release = match ctx.index.last_released(&package_name).await {
            Ok(Some(release)) => release,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(issue = self.number(), package = %package_name, error = %e, "Package index lookup failed");
                return Ok(());
            }
        };
        if release.published_at <= self.package.issue.created_at {
            return Ok(());
        }

        let body = ctx
            .ecosystem
            .release_comment(&self.owner, &package_name, &release.version);
        self.comment(body);
        self.close();
        self.add_label(Label::AutoClosed);
        self.auto_closed = true;
        self.flush(ctx).await?;
        info!(issue = self.number(), version = %release.version, "Closed published release request");

        if ctx.dry_run {
            info!(issue = self.number(), "[DRY RUN] Would record release in ledger");
            return Ok(());
        }
        ctx.ledger
            .record(&LedgerEntry {
                package_name,
                issue: self.package.issue.html_url.clone(),
                version: release.version,
                timestamp: release.published_at,
            })
            .await?;
        Ok(())
    }

    /// Applies queued intents in order.
    async fn flush(&mut self, ctx: &ProcessContext<'_>) -> Result<(), ProcessError> {
        let repo = &self.package.repository;
        let number = self.package.issue.number;
        let names = &ctx.config.labels;

        for intent in std::mem::take(&mut self.intents) {
            if ctx.dry_run {
                info!(issue = number, intent = ?intent, "[DRY RUN] Would apply");
                continue;
            }
            match intent {
                Intent::AddLabel(label) => {
                    ctx.tracker.add_label(repo, number, names.name(label)).await?;
                }
                Intent::RemoveLabel(label) => {
                    ctx.tracker
                        .remove_label(repo, number, names.name(label))
                        .await?;
                }
                Intent::Comment(body) => ctx.tracker.comment(repo, number, &body).await?,
                Intent::Close => ctx.tracker.close(repo, number).await?,
                Intent::Assign(login) => ctx.tracker.assign(repo, number, &login).await?,
            }
        }
        Ok(())
    }

    async fn readme_needs_change(&self, ctx: &ProcessContext<'_>) -> bool {
        if self.has_label(Label::Configured) {
            return false;
        }
        if !self.target_tag.contains("package-") {
            return true;
        }

        let Some(spec_path) =
            fields::resource_manager_path(&self.readme_link, &self.package.spec_repository)
        else {
            return true;
        };
        let readme_path = format!("{spec_path}/readme.md");
        match ctx
            .tracker
            .file_contents(&self.package.spec_repository, &readme_path)
            .await
        {
            Ok(readme) => match fields::first_readme_tag(&readme) {
                Some(tag) => !tag.contains(&self.target_tag) || self.has_label(Label::MultiApi),
                None => true,
            },
            Err(e) => {
                warn!(issue = self.number(), path = %readme_path, error = %e, "Failed to read specification readme");
                true
            }
        }
    }

    async fn trigger_pipeline(&self, ctx: &ProcessContext<'_>) -> Result<bool, PipelineError> {
        let output_folder = self.output_folder.clone().unwrap_or_default();
        let pipeline_url = ctx
            .config
            .pipeline
            .definitions
            .get(&output_folder)
            .cloned()
            .ok_or(PipelineError::UnknownPipeline { output_folder })?;

        let request = PipelineRequest {
            issue_link: self.package.issue.html_url.clone(),
            pipeline_url,
            spec_readme: format!("{}/readme.md", self.readme_link),
            target_tag: self.target_tag.clone(),
            spec_hash: self.spec_hash.clone(),
        };
        if ctx.dry_run {
            info!(issue = self.number(), url = %request.pipeline_url, "[DRY RUN] Would queue pipeline run");
            return Ok(true);
        }
        ctx.pipeline.run_pipeline(&request).await
    }

    /// Keeps an existing assignee, otherwise picks a candidate by issue number.
    fn resolve_assignee(&mut self, candidates: &BTreeSet<String>) {
        let assignees = &self.package.issue.assignees;
        if let Some(existing) = assignees
            .iter()
            .find(|login| candidates.contains(*login))
            .or_else(|| assignees.first())
        {
            self.assignee = existing.clone();
            return;
        }
        if candidates.is_empty() {
            return;
        }

        let index = (self.number() % candidates.len() as u64) as usize;
        if let Some(candidate) = candidates.iter().nth(index) {
            self.assignee = candidate.clone();
            self.intents.push(Intent::Assign(candidate.clone()));
        }
    }

    pub(crate) fn advise(&mut self, advice: impl Into<String>) {
        self.bot_advice.push(advice.into());
    }

    /// Puts the duplicate marker in front of all other advice.
    pub(crate) fn mark_duplicate(&mut self, marker: &str) {
        if !self.duplicate {
            self.duplicate = true;
            self.bot_advice.insert(0, marker.to_string());
        }
    }

    pub(crate) fn add_label(&mut self, label: Label) {
        if self.labels.insert(label) {
            self.intents.push(Intent::AddLabel(label));
        }
    }

    pub(crate) fn remove_label(&mut self, label: Label) {
        if self.labels.remove(label) {
            self.intents.push(Intent::RemoveLabel(label));
        }
    }

    pub(crate) fn comment(&mut self, body: String) {
        self.intents.push(Intent::Comment(body));
    }

    pub(crate) fn close(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.intents.push(Intent::Close);
        }
    }

    pub(crate) fn set_reminder(&mut self, reminder: Reminder) {
        self.reminder = Some(reminder);
    }

    #[cfg(test)]
    pub(crate) fn set_timing(&mut self, delay_time: i64, date_from_target: Option<i64>) {
        self.delay_time = delay_time;
        self.date_from_target = date_from_target;
    }

    #[must_use]
    pub fn has_label(&self, label: Label) -> bool {
        self.labels.contains(label)
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.package.issue.number
    }

    #[must_use]
    pub fn package(&self) -> &IssuePackage {
        &self.package
    }

    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    #[must_use]
    pub fn output_folder(&self) -> Option<&str> {
        self.output_folder.as_deref()
    }

    #[must_use]
    pub fn target_tag(&self) -> &str {
        &self.target_tag
    }

    #[must_use]
    pub fn spec_hash(&self) -> &str {
        &self.spec_hash
    }

    #[must_use]
    pub fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    /// Whole days since the last non-owner activity.
    #[must_use]
    pub fn delay_time(&self) -> i64 {
        self.delay_time
    }

    /// Days from today until the target date; negative once it has passed,
    /// `None` without a target date.
    #[must_use]
    pub fn date_from_target(&self) -> Option<i64> {
        self.date_from_target
    }

    #[must_use]
    pub fn bot_advice(&self) -> &[String] {
        &self.bot_advice
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn reply(&self) -> ReplyOutcome {
        self.reply
    }

    #[must_use]
    pub fn reminder(&self) -> Option<Reminder> {
        self.reminder
    }

    #[must_use]
    pub fn auto_closed(&self) -> bool {
        self.auto_closed
    }

    /// Whether an earlier issue of the run requests the same package.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    /// Mutations queued but not yet applied.
    #[must_use]
    pub fn pending_intents(&self) -> &[Intent] {
        &self.intents
    }
}
