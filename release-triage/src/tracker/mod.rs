//! Issue tracker access.
//!
//! The engine only talks to the tracker through [`IssueTracker`]. The GitHub
//! implementation lives in [`github`]; [`memory`] keeps everything in memory
//! and records mutations, which makes it suitable for tests and rehearsals.

mod error;
pub mod github;
pub mod memory;

pub use error::TrackerError;
pub use github::GitHubTracker;
pub use memory::MemoryTracker;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("expected 'owner/name', got '{s}'")),
        }
    }
}

impl TryFrom<String> for RepoRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoRef> for String {
    fn from(repo: RepoRef) -> Self {
        repo.to_string()
    }
}

/// Open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// Snapshot of a tracked issue.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Browser URL of the issue.
    pub html_url: String,
    /// Login of the issue author.
    pub author: String,
    /// Logins of the current assignees.
    pub assignees: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Issue body; empty when the issue has none.
    pub body: String,
    /// Raw label names.
    pub labels: Vec<String>,
    /// Current state.
    pub state: IssueState,
}

impl Issue {
    /// Returns the body split into lines.
    pub fn body_lines(&self) -> Vec<&str> {
        self.body.lines().collect()
    }
}

/// The parts of a comment the engine cares about.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Login of the comment author.
    pub author: String,
    /// Last update time of the comment.
    pub updated_at: DateTime<Utc>,
}

/// Which issues to fetch.
#[derive(Debug, Clone)]
pub struct IssueFilter {
    /// Repository holding the release requests.
    pub repository: RepoRef,
    /// Only issues carrying all of these labels.
    pub labels: Vec<String>,
}

/// Operations the engine needs from an issue tracker.
///
/// Every method is a single bounded request; implementations report timeouts
/// as [`TrackerError::Timeout`].
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists open issues matching `filter`, oldest first.
    async fn list_open_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>, TrackerError>;

    /// Returns every comment on an issue.
    async fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>, TrackerError>;

    async fn add_label(&self, repo: &RepoRef, number: u64, label: &str)
        -> Result<(), TrackerError>;

    async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError>;

    async fn comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<(), TrackerError>;

    async fn close(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError>;

    async fn assign(&self, repo: &RepoRef, number: u64, login: &str) -> Result<(), TrackerError>;

    /// Reads a text file from a repository's default branch.
    async fn file_contents(&self, repo: &RepoRef, path: &str) -> Result<String, TrackerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repo_ref() {
        let repo: RepoRef = "Azure/azure-rest-api-specs".parse().unwrap();
        assert_eq!(repo, RepoRef::new("Azure", "azure-rest-api-specs"));
        assert_eq!(repo.to_string(), "Azure/azure-rest-api-specs");
    }

    #[test]
    fn rejects_malformed_repo_ref() {
        assert!("Azure".parse::<RepoRef>().is_err());
        assert!("/name".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
    }
}
