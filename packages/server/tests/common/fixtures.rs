//! Test fixtures for creating test data.
//!
//! These fixtures go through the activities, the same path the API uses.

use review_core::domains::teams::activities::create_team;
use review_core::domains::teams::{Team, TeamMember};
use review_core::kernel::ServerDeps;

/// Create a team from `(user_id, is_active)` pairs.
pub async fn seed_team(deps: &ServerDeps, team_name: &str, members: &[(&str, bool)]) -> Team {
    let members = members
        .iter()
        .map(|(id, active)| TeamMember::new(*id, format!("User {}", id), *active))
        .collect();

    create_team(Team::new(team_name, members), deps)
        .await
        .expect("Failed to seed team")
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
