use crate::common::DomainError;
use crate::domains::teams::Team;
use crate::kernel::ServerDeps;

pub async fn get_team(team_name: &str, deps: &ServerDeps) -> Result<Team, DomainError> {
    Ok(deps.store.get_team(team_name).await?)
}
