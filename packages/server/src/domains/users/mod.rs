//! User domain - activity toggling and per-reviewer pull request listing

pub mod activities;
pub mod models;

pub use models::User;
