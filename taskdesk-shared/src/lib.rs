//! # Taskdesk Shared Library
//!
//! Shared types and business logic for the taskdesk API server.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, projects, tasks)
//! - `auth`: password hashing, bearer tokens, request authentication
//! - `workflow`: the task assignment state machine
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod workflow;

/// Current version of the taskdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
