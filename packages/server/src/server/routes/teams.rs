use std::collections::HashSet;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::teams::activities::{create_team, get_team};
use crate::domains::teams::{Team, TeamMember};
use crate::server::app::AppState;
use crate::server::routes::required;
use crate::server::ApiError;

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    team_name: Option<String>,
    #[serde(default)]
    members: Vec<TeamMemberRequest>,
}

#[derive(Deserialize)]
pub struct TeamMemberRequest {
    user_id: Option<String>,
    username: Option<String>,
    is_active: Option<bool>,
}

#[derive(Serialize)]
pub struct TeamResponse {
    team: Team,
}

#[derive(Deserialize)]
pub struct TeamQuery {
    team_name: Option<String>,
}

impl CreateTeamRequest {
    fn into_team(self) -> Result<Team, ApiError> {
        let team_name = required(self.team_name, "team_name")?;

        let mut seen = HashSet::with_capacity(self.members.len());
        let mut members = Vec::with_capacity(self.members.len());
        for member in self.members {
            let user_id = required(member.user_id, "members[].user_id")?;
            let username = required(member.username, "members[].username")?;
            let is_active = member
                .is_active
                .ok_or_else(|| ApiError::bad_request("members[].is_active is required"))?;

            if !seen.insert(user_id.clone()) {
                return Err(ApiError::bad_request(format!(
                    "duplicate member user_id: {}",
                    user_id
                )));
            }
            members.push(TeamMember::new(user_id, username, is_active));
        }

        Ok(Team::new(team_name, members))
    }
}

/// POST /team/add
pub async fn create_team_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let Json(request) = payload?;
    let team = request.into_team()?;

    let team = create_team(team, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=
pub async fn get_team_handler(
    Extension(state): Extension<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiError> {
    let Query(query) = query?;
    let team_name = required(query.team_name, "team_name")?;

    Ok(Json(get_team(&team_name, &state.deps).await?))
}
