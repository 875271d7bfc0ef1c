//! Package index error types.

use thiserror::Error;

/// Errors that can occur during package index lookups.
#[derive(Debug, Error)]
pub enum IndexError {
    /// HTTP transport or decoding error.
    #[error("package index request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete in time.
    #[error("package index request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: f64 },

    /// Invalid index base URL.
    #[error("invalid package index URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
