//! Per-ecosystem behavior.
//!
//! The per-issue state machine is shared by all SDK ecosystems. What differs
//! (which policies run and in which order, which companion metadata file
//! describes the package, how a published release is linked) is supplied by
//! an [`Ecosystem`] value.

mod python;

pub use python::Python;

use crate::policy::Policy;
use thiserror::Error;

/// Package facts read from the ecosystem's companion metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionInfo {
    /// Name of the package on the package index.
    pub package_name: String,
    /// SDK folder the package is generated into.
    pub output_folder: String,
    /// Whether the package bundles several API versions.
    pub multi_api: bool,
}

/// Errors while reading a companion metadata file.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// A required setting is missing.
    #[error("'{field}' not found in {file}")]
    MissingField { field: &'static str, file: &'static str },
}

/// Capability table for one SDK ecosystem.
pub trait Ecosystem: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Policies to evaluate, in report order.
    fn policies(&self) -> &[Policy];

    /// File next to the specification readme that configures this ecosystem.
    fn companion_file(&self) -> &'static str;

    /// Extracts package facts from the companion file.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError`] if a required setting is missing.
    fn read_companion(&self, contents: &str) -> Result<CompanionInfo, CompanionError>;

    /// Comment posted when an issue is closed because its release shipped.
    fn release_comment(&self, owner: &str, package: &str, version: &str) -> String;
}
