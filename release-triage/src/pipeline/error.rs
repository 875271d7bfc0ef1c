//! Pipeline trigger error types.

use thiserror::Error;

/// Errors that can occur while queuing a release pipeline.
///
/// The display text is posted to the issue verbatim, so keep it readable.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// HTTP transport error.
    #[error("pipeline request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete in time.
    #[error("pipeline request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: f64 },

    /// No pipeline is configured for the package's output folder.
    #[error("no release pipeline configured for '{output_folder}'")]
    UnknownPipeline { output_folder: String },
}
