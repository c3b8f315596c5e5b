/// Refresh-token issuance, rotation, and revocation
///
/// This module owns the token lifecycle. Every login issues a pair of
/// tokens; the refresh token is persisted as a SHA-256 hash so a database
/// read alone can never be replayed as a valid token, mirroring password
/// hashing practice.
///
/// # Rotation
///
/// Refresh tokens are single-use. Presenting one revokes its stored row
/// and issues a fresh pair. The revocation is a conditional update
/// (`SET revoked = TRUE ... WHERE revoked = FALSE`) so two concurrent
/// refresh calls with the same token cannot both succeed: exactly one
/// observes the row flip and wins, the other gets `Unauthenticated`.
///
/// # Example
///
/// ```no_run
/// use taskvault_shared::auth::tokens::TokenService;
/// use chrono::Duration;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let service = TokenService::new(
///     "access-secret-key-at-least-32-bytes!!".to_string(),
///     "refresh-secret-key-at-least-32-byte!!".to_string(),
///     Duration::minutes(15),
///     Duration::days(7),
/// );
///
/// let pair = service.issue(&pool, user_id).await?;
///
/// // Later, exchange the refresh token for a new pair
/// let rotated = service.rotate(&pool, user_id, &pair.refresh_token).await?;
///
/// // The old refresh token is now revoked and cannot be used again
/// assert!(service.rotate(&pool, user_id, &pair.refresh_token).await.is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{self, Claims, JwtError, TokenType};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token is missing, malformed, expired, revoked, or signed with the
    /// wrong secret. Deliberately carries no detail about which.
    #[error("Invalid or expired token")]
    Unauthenticated,

    /// Failed to sign a new token
    #[error("Failed to sign token: {0}")]
    Signing(JwtError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token (bearer)
    pub access_token: String,

    /// Long-lived refresh token (httpOnly cookie, single-use)
    pub refresh_token: String,
}

/// Stateless token service
///
/// Holds the two signing secrets and lifetimes; all persistent state lives
/// in the `refresh_tokens` table. Cloning is cheap enough for per-request
/// application state.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Creates a new token service
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Hashes a refresh token for storage (SHA-256, hex encoded)
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Signs a new access/refresh pair without persisting anything
    fn sign_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        let access_claims = Claims::new(user_id, TokenType::Access, self.access_ttl);
        let refresh_claims = Claims::new(user_id, TokenType::Refresh, self.refresh_ttl);

        let access_token =
            jwt::create_token(&access_claims, &self.access_secret).map_err(TokenError::Signing)?;
        let refresh_token = jwt::create_token(&refresh_claims, &self.refresh_secret)
            .map_err(TokenError::Signing)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Issues a new token pair for a user
    ///
    /// Persists the SHA-256 hash of the refresh token with its expiry;
    /// the raw refresh token exists only in the returned pair.
    pub async fn issue(&self, pool: &PgPool, user_id: Uuid) -> Result<TokenPair, TokenError> {
        let pair = self.sign_pair(user_id)?;

        RefreshToken::create(
            pool,
            CreateRefreshToken {
                user_id,
                token_hash: Self::hash_token(&pair.refresh_token),
                expires_at: Utc::now() + self.refresh_ttl,
            },
        )
        .await?;

        Ok(pair)
    }

    /// Verifies an access token and returns the user ID it belongs to
    pub fn verify_access(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = jwt::validate_access_token(token, &self.access_secret)
            .map_err(|_| TokenError::Unauthenticated)?;
        Ok(claims.sub)
    }

    /// Verifies a refresh token's signature and returns the user ID
    ///
    /// The refresh endpoint calls this before anything else: the user ID
    /// comes from a verified signature, never from an unverified decode.
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = jwt::validate_refresh_token(token, &self.refresh_secret)
            .map_err(|_| TokenError::Unauthenticated)?;
        Ok(claims.sub)
    }

    /// Rotates a refresh token: revokes the presented one, issues a new pair
    ///
    /// Fails with `Unauthenticated` if the presented token's signature is
    /// invalid, its stored row is missing, already revoked, or expired, or
    /// if a concurrent rotation won the conditional revoke.
    pub async fn rotate(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        presented: &str,
    ) -> Result<TokenPair, TokenError> {
        let claims = jwt::validate_refresh_token(presented, &self.refresh_secret)
            .map_err(|_| TokenError::Unauthenticated)?;
        if claims.sub != user_id {
            return Err(TokenError::Unauthenticated);
        }

        let token_hash = Self::hash_token(presented);
        let stored = RefreshToken::find_active(pool, user_id, &token_hash)
            .await?
            .ok_or(TokenError::Unauthenticated)?;

        // Single-use invariant: only the caller that flips the row wins.
        let revoked = RefreshToken::revoke_if_active(pool, stored.id).await?;
        if !revoked {
            tracing::debug!(user_id = %user_id, "Refresh token lost rotation race");
            return Err(TokenError::Unauthenticated);
        }

        self.issue(pool, user_id).await
    }

    /// Revokes every active refresh token for a user (logout)
    pub async fn revoke_all(&self, pool: &PgPool, user_id: Uuid) -> Result<u64, TokenError> {
        let count = RefreshToken::revoke_all_for_user(pool, user_id).await?;
        tracing::debug!(user_id = %user_id, count, "Revoked refresh tokens");
        Ok(count)
    }
}
