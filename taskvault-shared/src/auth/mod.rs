/// Authentication utilities
///
/// This module provides the authentication primitives for TaskVault:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT signing and validation (HS256, separate access/refresh secrets)
/// - [`tokens`]: Refresh-token issuance, rotation, and revocation
/// - [`middleware`]: Request authentication context
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Access Tokens**: Short-lived HS256 JWTs carried as bearer tokens
/// - **Refresh Tokens**: Long-lived HS256 JWTs, stored only as SHA-256
///   hashes, single-use via rotate-on-refresh

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod tokens;
