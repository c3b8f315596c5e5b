/// Refresh token model and database operations
///
/// Rows hold only the SHA-256 hash of the token, its expiry, and a revoked
/// flag. Rotation and logout flip `revoked` to true; rows are never
/// physically deleted, which preserves an audit trail of issued tokens.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Refresh token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    /// Unique record ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex hash of the raw token (never the token itself)
    pub token_hash: String,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked (rotation or logout)
    pub revoked: bool,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a newly issued refresh token
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex hash of the raw token
    pub token_hash: String,

    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Persists a new refresh token record
    pub async fn create(pool: &PgPool, data: CreateRefreshToken) -> Result<Self, sqlx::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, revoked, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.token_hash)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Finds a non-revoked, unexpired token by owner and hash
    ///
    /// The hash is deterministic, so lookup is an exact match rather than
    /// a scan over the user's active tokens.
    pub async fn find_active(
        pool: &PgPool,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked, created_at
            FROM refresh_tokens
            WHERE user_id = $1 AND token_hash = $2
              AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Revokes a token only if it is still active
    ///
    /// Returns true if this call flipped the flag. A concurrent rotation
    /// using the same token sees false and must treat it as invalid; the
    /// condition makes the single-use check atomic without a transaction.
    pub async fn revoke_if_active(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every non-revoked token for a user
    ///
    /// Returns the number of tokens revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts active (non-revoked, unexpired) tokens for a user
    pub async fn count_active_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM refresh_tokens
            WHERE user_id = $1 AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
