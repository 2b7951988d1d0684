//! In-process implementation of the persistence collaborators.
//!
//! Mirrors the constraints of the Postgres schema that the auth layer relies
//! on: unique emails, unique token values, cascade of a user's tokens on
//! delete. Used when no `DATABASE_URL` is configured and by the test suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chirpy_core::types::{Timestamp, UserId};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::user::{CreateUser, UpdateCredentials, User};
use crate::store::{StoreError, TokenStore, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// Users and refresh tokens held in memory behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every create/update returns [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a refresh-token row as-is, e.g. one that is already expired.
    pub async fn insert_refresh_token(&self, row: RefreshToken) {
        self.tables
            .write()
            .await
            .refresh_tokens
            .insert(row.token.clone(), row);
    }

    /// Delete a user and, like `ON DELETE CASCADE`, their refresh tokens.
    pub async fn remove_user(&self, id: UserId) -> bool {
        let mut tables = self.tables.write().await;
        tables.refresh_tokens.retain(|_, row| row.user_id != id);
        tables.users.remove(&id).is_some()
    }

    /// All refresh tokens issued to `user_id`, oldest first.
    pub async fn refresh_tokens_for(&self, user_id: UserId) -> Vec<RefreshToken> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .refresh_tokens
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created_at);
        rows
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".into()));
        }
        Ok(())
    }
}

fn email_taken(tables: &Tables, email: &str, except: Option<UserId>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if email_taken(&tables, &input.email, None) {
            return Err(StoreError::UniqueViolation("uq_users_email".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: input.email.clone(),
            hashed_password: input.hashed_password.clone(),
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_credentials(
        &self,
        id: UserId,
        input: &UpdateCredentials,
    ) -> Result<Option<User>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if email_taken(&tables, &input.email, Some(id)) {
            return Err(StoreError::UniqueViolation("uq_users_email".into()));
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.email = input.email.clone();
        user.hashed_password = input.hashed_password.clone();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn create_refresh_token(
        &self,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if tables.refresh_tokens.contains_key(&input.token) {
            return Err(StoreError::UniqueViolation("refresh_tokens_pkey".into()));
        }

        let now = Utc::now();
        let row = RefreshToken {
            token: input.token.clone(),
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
            expires_at: input.expires_at,
            revoked_at: None,
        };
        tables.refresh_tokens.insert(row.token.clone(), row.clone());
        Ok(row)
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        at: Timestamp,
    ) -> Result<Option<RefreshToken>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables.refresh_tokens.get_mut(token).map(|row| {
            row.revoked_at = Some(at);
            row.updated_at = at;
            row.clone()
        }))
    }
}
