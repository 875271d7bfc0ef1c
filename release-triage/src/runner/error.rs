//! Runner error types.

/// Errors that abort a triage run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Pipeline client initialization errors.
    #[error(transparent)]
    Pipeline(#[from] crate::pipeline::PipelineError),

    /// Package index client initialization errors.
    #[error(transparent)]
    Index(#[from] crate::index::IndexError),

    /// The release requests could not be listed.
    #[error("Failed to list release requests: {0}")]
    Tracker(#[from] crate::tracker::TrackerError),

    /// The status report could not be rendered.
    #[error(transparent)]
    Report(#[from] crate::report::ReportError),
}
