//! Pull request activities - the transactional assignment workflow
//!
//! Each activity opens one store transaction, returns early with `?` on any
//! error (dropping the transaction rolls it back) and commits at the end.

mod create_pull_request;
mod merge_pull_request;
mod reassign_reviewer;

pub use create_pull_request::create_pull_request;
pub use merge_pull_request::merge_pull_request;
pub use reassign_reviewer::{reassign_reviewer, Reassignment};
