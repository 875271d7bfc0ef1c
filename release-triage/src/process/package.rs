//! Issue package: the per-run snapshot a process starts from.

use crate::labels::{LabelNames, LabelSet};
use crate::tracker::{Issue, RepoRef};

/// One issue plus the handles needed to process it. Not modified during a run.
#[derive(Debug, Clone)]
pub struct IssuePackage {
    /// The issue as listed at the start of the run.
    pub issue: Issue,
    /// Repository the issue lives in.
    pub repository: RepoRef,
    /// Specification repository the issue body points into.
    pub spec_repository: RepoRef,
    /// Recognized labels at the start of the run.
    pub labels: LabelSet,
}

impl IssuePackage {
    pub fn new(
        issue: Issue,
        repository: RepoRef,
        spec_repository: RepoRef,
        names: &LabelNames,
    ) -> Self {
        let labels = names.label_set(&issue.labels);
        Self {
            issue,
            repository,
            spec_repository,
            labels,
        }
    }
}
