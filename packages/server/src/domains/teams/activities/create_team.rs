//! Create team activity

use tracing::{info, instrument, warn};

use crate::common::DomainError;
use crate::domains::teams::Team;
use crate::kernel::ServerDeps;

/// Create a team together with all of its members.
///
/// Returns the team as stored (members ordered by `user_id`).
#[instrument(skip(team, deps), fields(team_name = %team.team_name, members = team.members.len()))]
pub async fn create_team(team: Team, deps: &ServerDeps) -> Result<Team, DomainError> {
    let team = team.sorted();

    match deps.store.create_team(&team).await {
        Ok(()) => {
            info!("Team created");
            Ok(team)
        }
        Err(e) => {
            let err = DomainError::from(e);
            warn!(code = err.code(), "Team creation rejected");
            Err(err)
        }
    }
}
