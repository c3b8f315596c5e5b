/// API route handlers
///
/// Route modules:
/// - `health` - Health check endpoint
/// - `auth` - Registration, login, token refresh, logout
/// - `tasks` - Per-user task CRUD and status transitions

pub mod auth;
pub mod health;
pub mod tasks;
