//! Update user active status action

use tracing::{info, instrument};

use crate::common::DomainError;
use crate::domains::users::User;
use crate::kernel::ServerDeps;

/// Toggle whether a user can be picked as a reviewer.
///
/// Existing assignments are left untouched; an inactive user simply stops
/// being a candidate for new assignments and replacements.
#[instrument(skip(deps))]
pub async fn set_user_active_status(
    user_id: &str,
    is_active: bool,
    deps: &ServerDeps,
) -> Result<User, DomainError> {
    let user = deps.store.set_user_active(user_id, is_active).await?;
    info!(team_name = %user.team_name, "User status updated");
    Ok(user)
}
