use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status. `Merged` is terminal.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "pr_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

/// Pull request with its assigned reviewers (at most two, never the author).
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Insert payload; the store assigns `created_at`.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub assigned_reviewers: Vec<String>,
}

/// Summary row for the per-reviewer listing.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Transition to `Merged`. A pull request that is already merged keeps
    /// its original `merged_at`.
    pub fn mark_merged(&mut self, at: DateTime<Utc>) {
        if self.is_merged() {
            return;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(at);
    }

    /// Swap `old` for `new` in place, keeping its position in the list.
    ///
    /// Returns `false` when `old` is not assigned.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        match self.assigned_reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

impl NewPullRequest {
    /// Materialize the row as the store would after inserting it.
    pub fn into_open(self, created_at: DateTime<Utc>) -> PullRequest {
        PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: self.assigned_reviewers,
            created_at,
            merged_at: None,
        }
    }
}
