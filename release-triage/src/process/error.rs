//! Issue processing error types.

use thiserror::Error;

/// Errors that stop processing of a single issue.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Tracker read or write failed.
    #[error(transparent)]
    Tracker(#[from] crate::tracker::TrackerError),

    /// The ecosystem's companion metadata file is unusable.
    #[error("failed to read companion metadata: {0}")]
    Companion(#[from] crate::ecosystem::CompanionError),

    /// The release could not be recorded.
    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),
}
