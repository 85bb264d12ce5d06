// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Candidate selection and the merge/reassign rules live in the domains and
// only talk to storage through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseReviewStore)

use async_trait::async_trait;
use thiserror::Error;

use crate::common::Resource;
use crate::domains::pull_requests::{NewPullRequest, PullRequest, PullRequestShort};
use crate::domains::teams::Team;
use crate::domains::users::User;

/// Storage-level failures, independent of the backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0} already exists")]
    AlreadyExists(Resource),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

// =============================================================================
// Review Store Trait (Infrastructure - durable teams/users/pull requests)
// =============================================================================

#[async_trait]
pub trait BaseReviewStore: Send + Sync {
    /// Open a transaction. Dropping it without `commit` rolls back.
    async fn begin(&self) -> Result<Box<dyn BaseStoreTx>, StoreError>;

    /// Insert a team and all of its members atomically.
    async fn create_team(&self, team: &Team) -> Result<(), StoreError>;

    /// Team with members ordered by `user_id`.
    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError>;

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError>;

    /// Pull requests the user is assigned to review, newest first.
    async fn list_prs_by_reviewer(&self, user_id: &str)
        -> Result<Vec<PullRequestShort>, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Store Transaction Trait (Infrastructure - one atomic unit of work)
// =============================================================================

#[async_trait]
pub trait BaseStoreTx: Send {
    async fn get_user(&mut self, user_id: &str) -> Result<User, StoreError>;

    async fn list_team_members(&mut self, team_name: &str) -> Result<Vec<User>, StoreError>;

    /// Insert an OPEN pull request; the store assigns `created_at`.
    async fn insert_pull_request(&mut self, pr: &NewPullRequest) -> Result<PullRequest, StoreError>;

    /// Read a pull request and hold an exclusive lock on it until the
    /// transaction ends.
    async fn get_pull_request_for_update(&mut self, pull_request_id: &str)
        -> Result<PullRequest, StoreError>;

    /// Persist status, reviewers and merge timestamp.
    async fn update_pull_request(&mut self, pr: &PullRequest) -> Result<PullRequest, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
