//! Reassign reviewer activity

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument};

use crate::common::DomainError;
use crate::domains::pull_requests::selection::{choose_random, select_candidates};
use crate::domains::pull_requests::PullRequest;
use crate::kernel::ServerDeps;

/// Outcome of a successful reassignment.
#[derive(Serialize, Debug, Clone)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

/// Replace `old_user_id` on an OPEN pull request with one random active
/// member of `old_user_id`'s team.
///
/// The replacement is never the author nor anyone already assigned, and it
/// takes the old reviewer's position in the list.
///
/// Checks run in this order: pull request exists, not merged, old user
/// exists, old user is assigned, a candidate exists.
#[instrument(skip(deps))]
pub async fn reassign_reviewer(
    pull_request_id: &str,
    old_user_id: &str,
    deps: &ServerDeps,
) -> Result<Reassignment, DomainError> {
    let mut tx = deps.store.begin().await?;
    let mut pr = tx.get_pull_request_for_update(pull_request_id).await?;

    if pr.is_merged() {
        return Err(DomainError::AlreadyMerged);
    }

    let old_reviewer = tx.get_user(old_user_id).await?;
    if !pr.has_reviewer(&old_reviewer.user_id) {
        return Err(DomainError::NotAssigned);
    }

    let members = tx.list_team_members(&old_reviewer.team_name).await?;
    let mut exclude: HashSet<&str> = pr.assigned_reviewers.iter().map(String::as_str).collect();
    exclude.insert(pr.author_id.as_str());
    exclude.insert(old_reviewer.user_id.as_str());

    let candidates = select_candidates(&members, &exclude);
    let replaced_by = choose_random(&candidates, 1)
        .pop()
        .ok_or(DomainError::NoCandidate)?;

    let replaced = pr.replace_reviewer(&old_reviewer.user_id, &replaced_by);
    debug_assert!(replaced, "assignment was checked under the row lock");
    let updated = tx.update_pull_request(&pr).await?;
    tx.commit().await?;

    info!(replaced_by = %replaced_by, "Reviewer reassigned");
    Ok(Reassignment {
        pull_request: updated,
        replaced_by,
    })
}
