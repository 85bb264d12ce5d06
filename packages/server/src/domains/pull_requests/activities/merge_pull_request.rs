//! Merge pull request activity

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::common::DomainError;
use crate::domains::pull_requests::PullRequest;
use crate::kernel::ServerDeps;

/// Mark a pull request MERGED.
///
/// Idempotent: merging an already merged pull request returns it unchanged,
/// so `merged_at` always reflects the first successful merge.
#[instrument(skip(deps))]
pub async fn merge_pull_request(
    pull_request_id: &str,
    deps: &ServerDeps,
) -> Result<PullRequest, DomainError> {
    let mut tx = deps.store.begin().await?;
    let mut pr = tx.get_pull_request_for_update(pull_request_id).await?;

    if pr.is_merged() {
        tx.commit().await?;
        debug!("Pull request already merged");
        return Ok(pr);
    }

    pr.mark_merged(Utc::now());
    let merged = tx.update_pull_request(&pr).await?;
    tx.commit().await?;

    info!(merged_at = ?merged.merged_at, "Pull request merged");
    Ok(merged)
}
