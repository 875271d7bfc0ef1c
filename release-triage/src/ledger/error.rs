//! Ledger error types.

use thiserror::Error;

/// Errors that can occur while recording a release.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to open or write the ledger file.
    #[error("Failed to write ledger '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
