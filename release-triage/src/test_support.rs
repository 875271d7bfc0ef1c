//! Shared fixtures for unit tests.

use crate::config::TriageConfig;
use crate::ecosystem::Python;
use crate::index::{IndexError, PackageIndex, Release};
use crate::ledger::CsvLedger;
use crate::pipeline::{PipelineError, PipelineRequest, PipelineTrigger};
use crate::process::{IssuePackage, IssueProcess, ProcessContext};
use crate::tracker::{Issue, IssueState, MemoryTracker, RepoRef};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

pub(crate) const SPEC_PATH: &str = "specification/storage/resource-manager";

/// Fixed "now" for every unit test.
pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
}

pub(crate) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(crate) fn spec_repo() -> RepoRef {
    RepoRef::new("Azure", "azure-rest-api-specs")
}

/// An open `ManagementPlane` issue created today by `alice`.
pub(crate) fn issue(number: u64, body: &str) -> Issue {
    Issue {
        number,
        html_url: format!("https://github.com/Azure/sdk-release-request/issues/{number}"),
        author: "alice".to_string(),
        assignees: Vec::new(),
        created_at: now(),
        body: body.to_string(),
        labels: vec!["ManagementPlane".to_string()],
        state: IssueState::Open,
    }
}

/// Adds raw label names to `issue`.
pub(crate) fn labelled(mut issue: Issue, labels: &[&str]) -> Issue {
    issue.labels.extend(labels.iter().map(|l| (*l).to_string()));
    issue
}

/// A recognized release request body.
pub(crate) fn release_body(tag: &str, target_date: Option<&str>) -> String {
    let mut body = format!(
        "https://github.com/Azure/azure-rest-api-specs/tree/main/{SPEC_PATH}\n\
         ->Readme Tag: {tag}\n\
         ->hash: 0123abcd\n"
    );
    if let Some(date) = target_date {
        body.push_str(&format!("Target release date: {date}\n"));
    }
    body
}

/// Companion file for `azure-mgmt-storage`.
pub(crate) fn companion(multi_api: bool) -> String {
    let mut contents = String::from(
        "```yaml $(python)\n\
         package-name: azure-mgmt-storage\n\
         output-folder: $(python-sdks-folder)/storage/azure-mgmt-storage/azure/mgmt/storage\n",
    );
    if multi_api {
        contents.push_str("multiapi: true\n```\n\n``` yaml $(multi-api)\nbatch:\n");
    }
    contents.push_str("```\n");
    contents
}

pub(crate) fn spec_readme(tag: &str) -> String {
    format!("### Basic Information\n\n```yaml\nopenapi-type: arm\ntag: {tag}\n```\n")
}

/// Process for `issue` with default settings and no comments.
pub(crate) fn process_for(issue: Issue) -> IssueProcess {
    let config = TriageConfig::default();
    let package = IssuePackage::new(
        issue,
        config.repository.clone(),
        config.spec_repository.clone(),
        &config.labels,
    );
    IssueProcess::new(package, &[], &config.owners, now())
}

/// How [`FakePipeline`] answers.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PipelineAnswer {
    Accept,
    Refuse,
    TimeOut,
}

pub(crate) struct FakePipeline {
    answer: PipelineAnswer,
    requests: Mutex<Vec<PipelineRequest>>,
}

impl FakePipeline {
    pub(crate) fn new(answer: PipelineAnswer) -> Self {
        Self {
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<PipelineRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineTrigger for FakePipeline {
    async fn run_pipeline(&self, request: &PipelineRequest) -> Result<bool, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.answer {
            PipelineAnswer::Accept => Ok(true),
            PipelineAnswer::Refuse => Ok(false),
            PipelineAnswer::TimeOut => Err(PipelineError::Timeout { timeout_secs: 30.0 }),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeIndex {
    releases: Mutex<HashMap<String, Release>>,
    lookups: Mutex<usize>,
}

impl FakeIndex {
    pub(crate) fn publish(&self, package: &str, version: &str, published_at: DateTime<Utc>) {
        self.releases.lock().unwrap().insert(
            package.to_string(),
            Release {
                version: version.to_string(),
                published_at,
            },
        );
    }

    pub(crate) fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl PackageIndex for FakeIndex {
    async fn last_released(&self, package: &str) -> Result<Option<Release>, IndexError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self.releases.lock().unwrap().get(package).cloned())
    }
}

/// Collaborators for one test, backed by memory and a temporary ledger.
pub(crate) struct Harness {
    pub(crate) tracker: MemoryTracker,
    pub(crate) pipeline: FakePipeline,
    pub(crate) index: FakeIndex,
    pub(crate) ledger: CsvLedger,
    pub(crate) config: TriageConfig,
    pub(crate) dry_run: bool,
    _dir: TempDir,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_pipeline(PipelineAnswer::Accept)
    }

    pub(crate) fn with_pipeline(answer: PipelineAnswer) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = TriageConfig::default();
        config.ledger_file = dir.path().join("published.csv");
        config.pipeline.definitions.insert(
            "storage".to_string(),
            "https://dev.azure.com/org/project/_apis/pipelines/1/runs".to_string(),
        );

        Self {
            tracker: MemoryTracker::new(),
            pipeline: FakePipeline::new(answer),
            index: FakeIndex::default(),
            ledger: CsvLedger::new(config.ledger_file.clone()),
            config,
            dry_run: false,
            _dir: dir,
        }
    }

    /// Stores `issue` in the tracker and hands it back.
    pub(crate) fn track(&self, issue: Issue) -> Issue {
        self.tracker.add_issue(issue.clone());
        issue
    }

    /// Registers the companion file and a readme declaring `readme_tag`.
    pub(crate) fn add_spec(&self, multi_api: bool, readme_tag: &str) {
        let repo = spec_repo();
        self.tracker.add_file(
            &repo,
            &format!("{SPEC_PATH}/readme.python.md"),
            &companion(multi_api),
        );
        self.tracker
            .add_file(&repo, &format!("{SPEC_PATH}/readme.md"), &spec_readme(readme_tag));
    }

    pub(crate) fn ctx(&self) -> ProcessContext<'_> {
        ProcessContext {
            tracker: &self.tracker,
            pipeline: &self.pipeline,
            index: &self.index,
            ledger: &self.ledger,
            ecosystem: &Python,
            config: &self.config,
            dry_run: self.dry_run,
        }
    }

    pub(crate) fn ledger_rows(&self) -> Vec<String> {
        std::fs::read_to_string(self.ledger.path())
            .map(|contents| contents.lines().skip(1).map(String::from).collect())
            .unwrap_or_default()
    }
}
