// Common test utilities
#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
pub mod http;
pub mod postgres;

pub use fixtures::*;
pub use harness::*;
pub use http::*;
pub use postgres::*;
