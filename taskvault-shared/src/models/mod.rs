/// Database models for TaskVault
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `refresh_token`: Hashed refresh tokens with revocation
/// - `task`: Per-user tasks with a status lifecycle

pub mod refresh_token;
pub mod task;
pub mod user;
