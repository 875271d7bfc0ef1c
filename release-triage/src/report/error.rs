//! Report error types.

/// Report rendering and parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Handlebars rendering error.
    #[error("Report rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// A table row could not be read back.
    #[error("Malformed report row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}
