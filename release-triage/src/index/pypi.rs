//! PyPI JSON API client.

use super::{IndexError, PackageIndex, Release};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: DateTime<Utc>,
}

/// Package index backed by `https://pypi.org/pypi/<name>/json`.
pub struct PyPiIndex {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl PyPiIndex {
    /// Creates a client for the index rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> IndexError {
        if error.is_timeout() {
            IndexError::Timeout {
                timeout_secs: self.timeout.as_secs_f64(),
            }
        } else {
            IndexError::Http(error)
        }
    }
}

/// Picks the advertised version and the time its first file was uploaded.
fn latest_release(project: ProjectResponse) -> Option<Release> {
    let version = project.info.version;
    let published_at = project
        .releases
        .get(&version)?
        .iter()
        .map(|file| file.upload_time_iso_8601)
        .min()?;
    Some(Release {
        version,
        published_at,
    })
}

#[async_trait]
impl PackageIndex for PyPiIndex {
    async fn last_released(&self, package: &str) -> Result<Option<Release>, IndexError> {
        let url = self.base.join(&format!("pypi/{package}/json"))?;
        debug!(url = %url, "Querying package index");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let project: ProjectResponse = response
            .error_for_status()
            .map_err(|e| self.map_error(e))?
            .json()
            .await
            .map_err(|e| self.map_error(e))?;
        Ok(latest_release(project))
    }
}
