use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::pull_requests::PullRequestShort;
use crate::domains::users::activities::{get_user_review_prs, set_user_active_status};
use crate::domains::users::User;
use crate::server::app::AppState;
use crate::server::routes::required;
use crate::server::ApiError;

#[derive(Deserialize)]
pub struct SetIsActiveRequest {
    user_id: Option<String>,
    is_active: Option<bool>,
}

#[derive(Serialize)]
pub struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
pub struct UserQuery {
    user_id: Option<String>,
}

#[derive(Serialize)]
pub struct UserReviewsResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

/// POST /users/setIsActive
pub async fn set_is_active_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    let user_id = required(request.user_id, "user_id")?;
    let is_active = request
        .is_active
        .ok_or_else(|| ApiError::bad_request("is_active is required"))?;

    let user = set_user_active_status(&user_id, is_active, &state.deps).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=
pub async fn get_review_handler(
    Extension(state): Extension<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = required(query.user_id, "user_id")?;

    let pull_requests = get_user_review_prs(&user_id, &state.deps).await?;
    Ok(Json(UserReviewsResponse {
        user_id,
        pull_requests,
    }))
}
