use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::pull_requests::activities::{
    create_pull_request, merge_pull_request, reassign_reviewer, Reassignment,
};
use crate::domains::pull_requests::PullRequest;
use crate::server::app::AppState;
use crate::server::routes::required;
use crate::server::ApiError;

#[derive(Deserialize)]
pub struct CreatePullRequestRequest {
    pull_request_id: Option<String>,
    pull_request_name: Option<String>,
    author_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MergePullRequestRequest {
    pull_request_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ReassignRequest {
    pull_request_id: Option<String>,
    old_user_id: Option<String>,
    /// Legacy name for `old_user_id`, still sent by older clients.
    old_reviewer_id: Option<String>,
}

#[derive(Serialize)]
pub struct PullRequestResponse {
    pr: PullRequest,
}

impl ReassignRequest {
    /// `old_user_id` wins; the legacy field only fills in when it is absent
    /// or empty.
    fn old_user_id(&mut self) -> Option<String> {
        match self.old_user_id.take() {
            Some(id) if !id.is_empty() => Some(id),
            _ => self.old_reviewer_id.take(),
        }
    }
}

/// POST /pullRequest/create
pub async fn create_pull_request_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiError> {
    let Json(request) = payload?;
    let pull_request_id = required(request.pull_request_id, "pull_request_id")?;
    let pull_request_name = required(request.pull_request_name, "pull_request_name")?;
    let author_id = required(request.author_id, "author_id")?;

    let pr = create_pull_request(&pull_request_id, &pull_request_name, &author_id, &state.deps)
        .await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge
pub async fn merge_pull_request_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiError> {
    let Json(request) = payload?;
    let pull_request_id = required(request.pull_request_id, "pull_request_id")?;

    let pr = merge_pull_request(&pull_request_id, &state.deps).await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign
pub async fn reassign_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiError> {
    let Json(mut request) = payload?;
    let old_user_id = required(request.old_user_id(), "old_user_id")?;
    let pull_request_id = required(request.pull_request_id, "pull_request_id")?;

    let reassignment = reassign_reviewer(&pull_request_id, &old_user_id, &state.deps).await?;
    Ok(Json(reassignment))
}
