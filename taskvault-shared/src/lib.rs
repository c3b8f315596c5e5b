//! # TaskVault Shared Library
//!
//! Shared types and business logic used by the TaskVault API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their sqlx operations
//! - `auth`: Password hashing, JWT signing, refresh-token rotation
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskVault shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
