//! Repository for the `refresh_tokens` table.

use chirpy_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "token, user_id, created_at, updated_at, expires_at, revoked_at";

/// Provides create, lookup and revoke for refresh tokens. Rows are never deleted here.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Insert a new, unrevoked token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(&input.token)
            .bind(input.user_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token by exact value, regardless of revocation or expiry.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM refresh_tokens WHERE token = $1");
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Mark a token revoked at `at`. Unconditional, so re-revoking succeeds.
    ///
    /// Returns `None` if no row with the given token exists.
    pub async fn revoke(
        pool: &PgPool,
        token: &str,
        at: Timestamp,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!(
            "UPDATE refresh_tokens SET revoked_at = $2, updated_at = $2
             WHERE token = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
