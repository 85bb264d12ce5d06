//! Pull request domain - reviewer assignment, reassignment and merge
//!
//! Every mutation runs in one store transaction. Merge and reassignment lock
//! the pull request row first, so concurrent callers on the same id are
//! serialized while different ids never contend.

pub mod activities;
pub mod models;
pub mod selection;

pub use activities::*;
pub use models::{NewPullRequest, PullRequest, PullRequestShort, PullRequestStatus};
