// Reviewer Assignment Service - API Core
//
// Assigns code reviewers to pull requests within teams and manages the
// reassignment and merge lifecycle on top of PostgreSQL.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
