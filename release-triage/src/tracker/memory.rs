//! In-memory issue tracker.

use super::{Comment, Issue, IssueFilter, IssueState, IssueTracker, RepoRef, TrackerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A mutation applied to a [`MemoryTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddLabel { number: u64, label: String },
    RemoveLabel { number: u64, label: String },
    Comment { number: u64, body: String },
    Close { number: u64 },
    Assign { number: u64, login: String },
}

impl Mutation {
    /// Issue the mutation was applied to.
    #[must_use]
    pub fn number(&self) -> u64 {
        match self {
            Self::AddLabel { number, .. }
            | Self::RemoveLabel { number, .. }
            | Self::Comment { number, .. }
            | Self::Close { number }
            | Self::Assign { number, .. } => *number,
        }
    }
}

#[derive(Default)]
struct State {
    issues: Vec<Issue>,
    comments: HashMap<u64, Vec<Comment>>,
    files: HashMap<(RepoRef, String), String>,
    mutations: Vec<Mutation>,
}

/// Tracker that keeps issues, comments and files in memory and records every
/// mutation in order.
#[derive(Default)]
pub struct MemoryTracker {
    state: Mutex<State>,
}

impl MemoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&self, issue: Issue) {
        self.lock().issues.push(issue);
    }

    pub fn add_comment(&self, number: u64, comment: Comment) {
        self.lock().comments.entry(number).or_default().push(comment);
    }

    pub fn add_file(&self, repo: &RepoRef, path: &str, contents: &str) {
        self.lock()
            .files
            .insert((repo.clone(), path.to_string()), contents.to_string());
    }

    /// Every mutation applied so far, oldest first.
    #[must_use]
    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().mutations.clone()
    }

    /// Mutations applied to a single issue.
    #[must_use]
    pub fn mutations_for(&self, number: u64) -> Vec<Mutation> {
        self.lock()
            .mutations
            .iter()
            .filter(|m| m.number() == number)
            .cloned()
            .collect()
    }

    /// Current snapshot of an issue.
    #[must_use]
    pub fn issue(&self, number: u64) -> Option<Issue> {
        self.lock().issues.iter().find(|i| i.number == number).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mutate(
        &self,
        number: u64,
        mutation: Mutation,
        apply: impl FnOnce(&mut Issue),
    ) -> Result<(), TrackerError> {
        let mut state = self.lock();
        let issue = state
            .issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(TrackerError::IssueNotFound { number })?;
        apply(issue);
        state.mutations.push(mutation);
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for MemoryTracker {
    async fn list_open_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>, TrackerError> {
        Ok(self
            .lock()
            .issues
            .iter()
            .filter(|issue| issue.state == IssueState::Open)
            .filter(|issue| filter.labels.iter().all(|l| issue.labels.contains(l)))
            .cloned()
            .collect())
    }

    async fn comments(&self, _repo: &RepoRef, number: u64) -> Result<Vec<Comment>, TrackerError> {
        Ok(self.lock().comments.get(&number).cloned().unwrap_or_default())
    }

    async fn add_label(
        &self,
        _repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        let mutation = Mutation::AddLabel {
            number,
            label: label.to_string(),
        };
        self.mutate(number, mutation, |issue| {
            if !issue.labels.iter().any(|l| l == label) {
                issue.labels.push(label.to_string());
            }
        })
    }

    async fn remove_label(
        &self,
        _repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), TrackerError> {
        let mutation = Mutation::RemoveLabel {
            number,
            label: label.to_string(),
        };
        self.mutate(number, mutation, |issue| issue.labels.retain(|l| l != label))
    }

    async fn comment(&self, _repo: &RepoRef, number: u64, body: &str) -> Result<(), TrackerError> {
        let mutation = Mutation::Comment {
            number,
            body: body.to_string(),
        };
        self.mutate(number, mutation, |_| {})
    }

    async fn close(&self, _repo: &RepoRef, number: u64) -> Result<(), TrackerError> {
        self.mutate(number, Mutation::Close { number }, |issue| {
            issue.state = IssueState::Closed;
        })
    }

    async fn assign(&self, _repo: &RepoRef, number: u64, login: &str) -> Result<(), TrackerError> {
        let mutation = Mutation::Assign {
            number,
            login: login.to_string(),
        };
        self.mutate(number, mutation, |issue| {
            issue.assignees.push(login.to_string());
        })
    }

    async fn file_contents(&self, repo: &RepoRef, path: &str) -> Result<String, TrackerError> {
        self.lock()
            .files
            .get(&(repo.clone(), path.to_string()))
            .cloned()
            .ok_or_else(|| TrackerError::FileNotFound {
                repo: repo.to_string(),
                path: path.to_string(),
            })
    }
}
