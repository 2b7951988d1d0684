//! Stateful opaque refresh tokens.
//!
//! A refresh token is 32 random bytes, hex-encoded, persisted through the
//! [`TokenStore`] collaborator. It is usable while it is neither revoked nor
//! past `expires_at`; revocation is a blind, idempotent update.

use std::sync::Arc;

use chirpy_core::error::CoreError;
use chirpy_core::types::{Timestamp, UserId};
use chirpy_db::models::refresh_token::{CreateRefreshToken, RefreshToken};
use chirpy_db::{StoreError, TokenStore};
use chrono::{Duration, Utc};
use rand::RngCore;

/// Number of random bytes behind each token (64 hex characters).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Default refresh token lifetime in days.
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token expiry is out of range")]
    ExpiryOutOfRange,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RefreshTokenError> for CoreError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::NotFound => CoreError::NotFound {
                entity: "refresh token",
            },
            RefreshTokenError::ExpiryOutOfRange => {
                CoreError::internal("Refresh token expiry is out of range")
            }
            RefreshTokenError::Store(e) => e.into(),
        }
    }
}

/// Creates, looks up and revokes refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenStore {
    rows: Arc<dyn TokenStore>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(rows: Arc<dyn TokenStore>, ttl: Duration) -> Self {
        Self { rows, ttl }
    }

    /// Draw a new token value: 64 lowercase hex characters from a CSPRNG.
    ///
    /// No uniqueness retry; the primary key on the token column is the backstop.
    pub fn generate() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Persist a fresh token for `user_id`, returning the full record.
    ///
    /// This is the only place the token value is handed back to a caller.
    pub async fn create(&self, user_id: UserId) -> Result<RefreshToken, RefreshTokenError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(RefreshTokenError::ExpiryOutOfRange)?;
        let input = CreateRefreshToken {
            token: Self::generate(),
            user_id,
            expires_at,
        };
        let record = self.rows.create_refresh_token(&input).await?;
        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token created");
        Ok(record)
    }

    /// Exact-match lookup, regardless of revocation or expiry.
    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        self.rows
            .find_refresh_token(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)
    }

    pub fn is_usable(record: &RefreshToken, now: Timestamp) -> bool {
        record.is_usable(now)
    }

    /// Mark the token revoked now. Re-revoking succeeds silently.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        let record = self
            .rows
            .revoke_refresh_token(token, Utc::now())
            .await?
            .ok_or(RefreshTokenError::NotFound)?;
        tracing::debug!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }
}
