//! Release pipeline triggering.

mod devops;
mod error;

pub use devops::DevOpsPipeline;
pub use error::PipelineError;

use async_trait::async_trait;
use serde::Serialize;

/// Everything a release pipeline run needs to know about a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRequest {
    /// Browser URL of the release request issue.
    pub issue_link: String,
    /// Run endpoint of the pipeline to queue.
    pub pipeline_url: String,
    /// Link to the specification readme.
    pub spec_readme: String,
    /// Readme tag to generate from.
    pub target_tag: String,
    /// Commit of the specification repository to generate from.
    pub spec_hash: String,
}

/// Queues release pipeline runs.
#[async_trait]
pub trait PipelineTrigger: Send + Sync {
    /// Queues one run. `Ok(true)` means the run was accepted, `Ok(false)`
    /// that the service answered but refused it.
    async fn run_pipeline(&self, request: &PipelineRequest) -> Result<bool, PipelineError>;
}
