//! Team domain - team creation and lookup
//!
//! Membership is fixed when the team is created; members can only be
//! toggled active/inactive afterwards (see the users domain).

pub mod activities;
pub mod models;

pub use models::{Team, TeamMember};
