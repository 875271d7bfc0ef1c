//! Runner configuration.

use std::path::{Path, PathBuf};

/// Command-line level settings for one triage run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the triage configuration file.
    config_path: PathBuf,
    /// GitHub token used for API calls.
    token: String,
    /// Whether to log mutations instead of applying them.
    dry_run: bool,
    /// Overrides the configured number of concurrent issues.
    concurrency: Option<usize>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(config_path: PathBuf, token: String, dry_run: bool) -> Self {
        Self {
            config_path,
            token,
            dry_run,
            concurrency: None,
        }
    }

    /// Overrides the configured concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Returns the triage configuration file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the concurrency override, if any.
    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }
}
