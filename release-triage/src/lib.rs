#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod batch;
pub mod config;
pub mod ecosystem;
pub mod index;
pub mod labels;
pub mod ledger;
pub mod pipeline;
pub mod policy;
pub mod process;
pub mod report;
pub mod runner;
pub mod summary;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{duplicated_policy, Batch, BatchOutcome, IssueResult, DUPLICATE_MARKER};
pub use config::{ConfigError, IndexSettings, PipelineSettings, TriageConfig};
pub use ecosystem::{CompanionError, CompanionInfo, Ecosystem, Python};
pub use index::{IndexError, PackageIndex, PyPiIndex, Release};
pub use labels::{Label, LabelNames, LabelSet};
pub use ledger::{CsvLedger, LedgerEntry, LedgerError};
pub use pipeline::{DevOpsPipeline, PipelineError, PipelineRequest, PipelineTrigger};
pub use policy::Policy;
pub use process::{
    Intent, IssuePackage, IssueProcess, ProcessContext, ProcessError, Reminder, ReplyOutcome,
    Stage,
};
pub use report::{parse_report, render_report, ReportError, ReportRow};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::RunSummary;
pub use tracker::{
    Comment, GitHubTracker, Issue, IssueFilter, IssueState, IssueTracker, MemoryTracker, RepoRef,
    TrackerError,
};
