//! Persistence collaborator traits.
//!
//! The auth layer talks to storage only through [`UserStore`] and
//! [`TokenStore`], so it can run against Postgres ([`PgStore`]) or the
//! in-process [`MemoryStore`](crate::memory::MemoryStore). Every method is a
//! single-row operation; atomicity is whatever the backing store gives a
//! single statement.

use async_trait::async_trait;
use chirpy_core::error::CoreError;
use chirpy_core::types::{Timestamp, UserId};

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::user::{CreateUser, UpdateCredentials, User};
use crate::repositories::{RefreshTokenRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Failure reported by a persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint (email, token value) rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return Self::UniqueViolation(constraint);
            }
        }
        Self::Database(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            )),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

/// User persistence: create, find-by-email, update.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns `None` when the user no longer exists.
    async fn update_user_credentials(
        &self,
        id: UserId,
        input: &UpdateCredentials,
    ) -> Result<Option<User>, StoreError>;
}

/// Refresh-token persistence: create-row, find-by-token, update-row-by-token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, StoreError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Sets `revoked_at` and `updated_at` to `at`. Returns `None` when no row matches.
    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: Timestamp,
    ) -> Result<Option<RefreshToken>, StoreError>;
}

/// Postgres-backed collaborator delegating to the repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn update_user_credentials(
        &self,
        id: UserId,
        input: &UpdateCredentials,
    ) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::update_credentials(&self.pool, id, input).await?)
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn create_refresh_token(
        &self,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, StoreError> {
        Ok(RefreshTokenRepo::create(&self.pool, input).await?)
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(RefreshTokenRepo::find_by_token(&self.pool, token).await?)
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: Timestamp,
    ) -> Result<Option<RefreshToken>, StoreError> {
        Ok(RefreshTokenRepo::revoke(&self.pool, token, at).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err: CoreError = StoreError::UniqueViolation("uq_users_email".into()).into();
        assert_matches!(err, CoreError::Conflict(msg) if msg.contains("uq_users_email"));
    }

    #[test]
    fn test_other_store_errors_map_to_internal() {
        let err: CoreError = StoreError::Unavailable("connection reset".into()).into();
        assert_matches!(err, CoreError::Internal(_));

        let err: CoreError = StoreError::from(sqlx::Error::PoolTimedOut).into();
        assert_matches!(err, CoreError::Internal(_));
    }
}
