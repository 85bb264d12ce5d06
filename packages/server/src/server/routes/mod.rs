// HTTP routes
pub mod health;
pub mod metrics;
pub mod pull_requests;
pub mod teams;
pub mod users;

pub use health::*;
pub use metrics::*;
pub use pull_requests::*;
pub use teams::*;
pub use users::*;

use crate::server::ApiError;

/// Required string field: present and not blank. The original value is kept.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("{} is required", field))),
    }
}
