//! Create pull request activity

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::common::DomainError;
use crate::domains::pull_requests::selection::{choose_random, select_candidates, MAX_REVIEWERS};
use crate::domains::pull_requests::{NewPullRequest, PullRequest};
use crate::kernel::ServerDeps;

/// Create an OPEN pull request with up to two reviewers from the author's team.
///
/// Too few eligible teammates is not an error: the pull request is created
/// with one reviewer or none.
#[instrument(skip(pull_request_name, deps))]
pub async fn create_pull_request(
    pull_request_id: &str,
    pull_request_name: &str,
    author_id: &str,
    deps: &ServerDeps,
) -> Result<PullRequest, DomainError> {
    let mut tx = deps.store.begin().await?;

    let author = tx.get_user(author_id).await?;
    let members = tx.list_team_members(&author.team_name).await?;

    let exclude = HashSet::from([author.user_id.as_str()]);
    let candidates = select_candidates(&members, &exclude);
    let reviewers = choose_random(&candidates, MAX_REVIEWERS);
    debug!(
        team_name = %author.team_name,
        candidates = candidates.len(),
        "Selected reviewers"
    );

    let created = tx
        .insert_pull_request(&NewPullRequest {
            pull_request_id: pull_request_id.to_string(),
            pull_request_name: pull_request_name.to_string(),
            author_id: author.user_id.clone(),
            assigned_reviewers: reviewers,
        })
        .await?;
    tx.commit().await?;

    info!(reviewers = ?created.assigned_reviewers, "Pull request created");
    Ok(created)
}
