//! GitHub implementation of [`IssueTracker`].

mod rate_limit;

pub use rate_limit::{check_core_rate_limit, wait_if_needed, RateLimitInfo};

use super::{Comment, Issue, IssueFilter, IssueState, IssueTracker, RepoRef, TrackerError};
use async_trait::async_trait;
use octocrab::{models, params, Octocrab};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Issues per page when listing.
const PER_PAGE: u8 = 100;

/// Issue tracker backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubTracker {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubTracker {
    /// Wraps an authenticated client. Every request is bounded by `timeout`.
    pub fn new(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, TrackerError>
    where
        F: Future<Output = octocrab::Result<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TrackerError::Timeout {
                timeout_secs: self.timeout.as_secs_f64(),
            }),
        }
    }

    /// Waits for rate limit headroom before a mutating call.
    async fn before_write(&self) -> Result<(), TrackerError> {
        let info = self.bounded(check_core_rate_limit(&self.octocrab)).await?;
        wait_if_needed(&info).await;
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn list_open_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>, TrackerError> {
        let repo = &filter.repository;
        debug!(repo = %repo, labels = ?filter.labels, "Listing open issues");

        let first_page = self
            .bounded(
                self.octocrab
                    .issues(&repo.owner, &repo.name)
                    .list()
                    .state(params::State::Open)
                    .labels(&filter.labels)
                    .direction(params::Direction::Ascending)
                    .per_page(PER_PAGE)
                    .send(),
            )
            .await?;
        let all = self.bounded(self.octocrab.all_pages(first_page)).await?;

        Ok(all
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(convert_issue)
            .collect())
    }

    async fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>, TrackerError> {
        let first_page = self
            .bounded(
                self.octocrab
                    .issues(&repo.owner, &repo.name)
                    .list_comments(number)
                    .per_page(PER_PAGE)
                    .send(),
            )
            .await?;
        let all = self.bounded(self.octocrab.all_pages(first_page)).await?;

        Ok(all
            .into_iter()
            .map(|comment| Comment {
                author: comment.user.login,
                updated_at: comment.updated_at.unwrap_or(comment.created_at),
            })
            .collect())
    }

    async fn add_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        self.before_write().await?;
        let labels = [label.to_string()];
        self.bounded(
            self.octocrab
                .issues(&repo.owner, &repo.name)
                .add_labels(number, &labels),
        )
        .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        self.before_write().await?;
        self.bounded(
            self.octocrab
                .issues(&repo.owner, &repo.name)
                .remove_label(number, label),
        )
        .await?;
        Ok(())
    }

    async fn comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<(), TrackerError> {
        self.before_write().await?;
        self.bounded(
            self.octocrab
                .issues(&repo.owner, &repo.name)
                .create_comment(number, body),
        )
        .await?;
        Ok(())
    }

    async fn close(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError> {
        self.before_write().await?;
        self.bounded(
            self.octocrab
                .issues(&repo.owner, &repo.name)
                .update(number)
                .state(models::IssueState::Closed)
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn assign(&self, repo: &RepoRef, number: u64, login: &str) -> Result<(), TrackerError> {
        self.before_write().await?;
        self.bounded(
            self.octocrab
                .issues(&repo.owner, &repo.name)
                .add_assignees(number, &[login]),
        )
        .await?;
        Ok(())
    }

    async fn file_contents(&self, repo: &RepoRef, path: &str) -> Result<String, TrackerError> {
        debug!(repo = %repo, path, "Reading repository file");
        let content = self
            .bounded(
                self.octocrab
                    .repos(&repo.owner, &repo.name)
                    .get_content()
                    .path(path)
                    .send(),
            )
            .await?;

        content
            .items
            .first()
            .and_then(|item| item.decoded_content())
            .ok_or_else(|| TrackerError::FileNotFound {
                repo: repo.to_string(),
                path: path.to_string(),
            })
    }
}

fn convert_issue(issue: models::issues::Issue) -> Issue {
    let state = if matches!(issue.state, models::IssueState::Closed) {
        IssueState::Closed
    } else {
        IssueState::Open
    };

    Issue {
        number: issue.number,
        html_url: issue.html_url.to_string(),
        author: issue.user.login,
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        created_at: issue.created_at,
        body: issue.body.unwrap_or_default(),
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        state,
    }
}
