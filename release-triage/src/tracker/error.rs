//! Issue tracker error types.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The request did not complete in time.
    #[error("Tracker request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: f64 },

    /// The requested file does not exist or is not a text file.
    #[error("File '{path}' not found in {repo}")]
    FileNotFound { repo: String, path: String },

    /// The issue does not exist.
    #[error("Issue #{number} not found")]
    IssueNotFound { number: u64 },
}
