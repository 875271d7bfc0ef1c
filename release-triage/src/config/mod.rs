//! Triage configuration.
//!
//! Settings are read from a TOML file with kebab-case keys. Every key is
//! optional; the defaults describe the Python release request queue.
//!
//! ```toml
//! repository = "Azure/sdk-release-request"
//! filter-labels = ["ManagementPlane"]
//! owners = ["azure-sdk", "msyyc"]
//! assignees = ["Wzb123456789"]
//! timeout-secs = 30
//!
//! [labels]
//! hold-on = "HoldOn"
//!
//! [pipeline.definitions]
//! storage = "https://dev.azure.com/org/project/_apis/pipelines/42/runs?api-version=7.1"
//! ```

mod error;

pub use error::ConfigError;

use crate::labels::{Label, LabelNames};
use crate::tracker::RepoRef;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Settings for one triage run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TriageConfig {
    /// Repository holding the release request issues.
    pub repository: RepoRef,
    /// Only issues carrying all of these labels are processed.
    pub filter_labels: Vec<String>,
    /// Repository the issue bodies link into.
    pub spec_repository: RepoRef,
    /// Accounts whose comments do not count as activity.
    pub owners: BTreeSet<String>,
    /// Accounts issues are assigned to.
    pub assignees: BTreeSet<String>,
    /// Tracker names of the recognized labels.
    pub labels: LabelNames,
    /// CSV file recording auto-closed releases.
    pub ledger_file: PathBuf,
    /// Markdown status report.
    pub report_file: PathBuf,
    /// Issues processed at the same time.
    pub concurrency: usize,
    /// Limit for each external request.
    pub timeout_secs: u64,
    pub pipeline: PipelineSettings,
    pub index: IndexSettings,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            repository: RepoRef::new("Azure", "sdk-release-request"),
            filter_labels: vec!["ManagementPlane".to_string()],
            spec_repository: RepoRef::new("Azure", "azure-rest-api-specs"),
            owners: ["azure-sdk", "msyyc"].into_iter().map(String::from).collect(),
            assignees: ["Wzb123456789"].into_iter().map(String::from).collect(),
            labels: LabelNames::default(),
            ledger_file: PathBuf::from("published_issues_python.csv"),
            report_file: PathBuf::from("release_python_status.md"),
            concurrency: 1,
            timeout_secs: 30,
            pipeline: PipelineSettings::default(),
            index: IndexSettings::default(),
        }
    }
}

/// Release pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Environment variable holding the pipeline service token.
    pub token_env: String,
    /// Pipeline run URL per SDK output folder.
    pub definitions: BTreeMap<String, String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            token_env: "AZURE_DEVOPS_TOKEN".to_string(),
            definitions: BTreeMap::new(),
        }
    }
}

impl PipelineSettings {
    /// Reads the pipeline token from the configured environment variable.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }
}

/// Package index settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct IndexSettings {
    pub base_url: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            base_url: "https://pypi.org".to_string(),
        }
    }
}

impl TriageConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, malformed
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        config.validate(path)?;
        debug!(
            repository = %config.repository,
            pipelines = config.pipeline.definitions.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(invalid("timeout-secs must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for label in Label::ALL {
            let name = self.labels.name(label);
            if name.trim().is_empty() {
                return Err(invalid(format!("label name for {label:?} must not be empty")));
            }
            if !seen.insert(name) {
                return Err(invalid(format!("label name '{name}' is used twice")));
            }
        }

        for (folder, url) in &self.pipeline.definitions {
            if Url::parse(url).is_err() {
                return Err(invalid(format!(
                    "pipeline URL for '{folder}' is not a valid URL: {url}"
                )));
            }
        }

        if Url::parse(&self.index.base_url).is_err() {
            return Err(invalid(format!(
                "index base-url is not a valid URL: {}",
                self.index.base_url
            )));
        }

        Ok(())
    }
}
