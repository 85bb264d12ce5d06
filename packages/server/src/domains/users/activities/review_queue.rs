use crate::common::DomainError;
use crate::domains::pull_requests::PullRequestShort;
use crate::kernel::ServerDeps;

/// Pull requests assigned to `user_id`, newest first.
///
/// An unknown user has nothing to review, so this returns an empty list
/// rather than `NotFound`.
pub async fn get_user_review_prs(
    user_id: &str,
    deps: &ServerDeps,
) -> Result<Vec<PullRequestShort>, DomainError> {
    Ok(deps.store.list_prs_by_reviewer(user_id).await?)
}
