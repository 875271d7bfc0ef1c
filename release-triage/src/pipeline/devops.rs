//! Azure DevOps pipeline runs.

use super::{PipelineError, PipelineRequest, PipelineTrigger};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Queues Azure DevOps pipeline runs through the REST API.
pub struct DevOpsPipeline {
    client: reqwest::Client,
    token: Option<String>,
    timeout: Duration,
}

impl DevOpsPipeline {
    /// Creates a trigger authenticating with a personal access token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token,
            timeout,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> PipelineError {
        if error.is_timeout() {
            PipelineError::Timeout {
                timeout_secs: self.timeout.as_secs_f64(),
            }
        } else {
            PipelineError::Http(error)
        }
    }
}

/// Builds the run request body; request fields become pipeline variables.
fn run_body(request: &PipelineRequest) -> Value {
    json!({
        "variables": {
            "ISSUE_LINK": { "value": request.issue_link },
            "SPEC_README": { "value": request.spec_readme },
            "TARGET_TAG": { "value": request.target_tag },
            "SPEC_HASH": { "value": request.spec_hash },
        }
    })
}

#[async_trait]
impl PipelineTrigger for DevOpsPipeline {
    async fn run_pipeline(&self, request: &PipelineRequest) -> Result<bool, PipelineError> {
        debug!(url = %request.pipeline_url, issue = %request.issue_link, "Queuing pipeline run");

        let mut builder = self
            .client
            .post(&request.pipeline_url)
            .json(&run_body(request));
        if let Some(token) = &self.token {
            builder = builder.basic_auth("", Some(token));
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            warn!(status = %status, url = %request.pipeline_url, "Pipeline run was not accepted");
            Ok(false)
        }
    }
}
