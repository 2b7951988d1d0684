//! Session orchestration: register, login, refresh, revoke, credential update.
//!
//! A login session moves from Active to Expired (passively, once `now >=
//! expires_at`) or to Revoked (explicitly, terminal). Both end states look the
//! same to `refresh`.

use std::sync::Arc;

use chirpy_core::error::CoreError;
use chirpy_core::types::UserId;
use chirpy_db::models::refresh_token::RefreshToken;
use chirpy_db::models::user::{CreateUser, UpdateCredentials, User};
use chirpy_db::{TokenStore, UserStore};
use chrono::{Duration, Utc};

use crate::auth::access_token::{issue_access_token, validate_access_token};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::refresh::{RefreshTokenError, RefreshTokenStore};
use crate::config::AuthConfig;

/// Message for any login failure after the user was found.
const BAD_CREDENTIALS: &str = "incorrect email or password";

/// Message for every refresh failure: unknown, expired and revoked look alike.
const BAD_REFRESH_TOKEN: &str = "invalid or expired refresh token";

/// Everything a successful login hands back to the caller.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenStore,
    hasher: PasswordHasher,
    secret: String,
    access_token_ttl: Duration,
}

impl SessionService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenStore>, config: &AuthConfig) -> Self {
        Self {
            users,
            refresh_tokens: RefreshTokenStore::new(tokens, config.refresh_token_ttl),
            hasher: PasswordHasher::new(config.password_params.clone()),
            secret: config.jwt_secret.clone(),
            access_token_ttl: config.access_token_ttl,
        }
    }

    /// Create a user with a freshly hashed password.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, CoreError> {
        let hashed_password = self.hash_password(password)?;
        let user = self
            .users
            .create_user(&CreateUser {
                email: email.to_string(),
                hashed_password,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and open a new session.
    ///
    /// Each login creates a new refresh token; earlier ones stay usable. If the
    /// refresh token cannot be persisted the whole login fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, CoreError> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(CoreError::NotFound { entity: "user" })?;

        if let Err(e) = self.hasher.verify(password, &user.hashed_password) {
            match &e {
                PasswordError::MalformedHash(_) => {
                    tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable")
                }
                _ => tracing::debug!(user_id = %user.id, "Login rejected: password mismatch"),
            }
            return Err(CoreError::unauthorized(BAD_CREDENTIALS));
        }

        let access_token = issue_access_token(user.id, &self.secret, self.access_token_ttl)?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a usable refresh token for a new access token.
    ///
    /// The refresh token itself is neither rotated nor extended.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, CoreError> {
        let record = match self.refresh_tokens.lookup(refresh_token).await {
            Ok(record) => record,
            Err(RefreshTokenError::NotFound) => {
                tracing::debug!("Refresh rejected: unknown token");
                return Err(CoreError::unauthorized(BAD_REFRESH_TOKEN));
            }
            Err(e) => return Err(e.into()),
        };

        if !RefreshTokenStore::is_usable(&record, Utc::now()) {
            tracing::debug!(
                user_id = %record.user_id,
                revoked = record.revoked_at.is_some(),
                "Refresh rejected: token no longer usable"
            );
            return Err(CoreError::unauthorized(BAD_REFRESH_TOKEN));
        }

        Ok(issue_access_token(
            record.user_id,
            &self.secret,
            self.access_token_ttl,
        )?)
    }

    /// Revoke a refresh token. Revoking twice succeeds; an unknown token is `NotFound`.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), CoreError> {
        self.refresh_tokens.revoke(refresh_token).await?;
        Ok(())
    }

    /// Resolve an access token to the user it was issued for.
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, CoreError> {
        Ok(validate_access_token(access_token, &self.secret)?)
    }

    /// Replace the email and password of the user owning `access_token`.
    pub async fn update_credentials(
        &self,
        access_token: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CoreError> {
        let user_id = self.authenticate(access_token)?;
        let hashed_password = self.hash_password(password)?;

        let user = self
            .users
            .update_user_credentials(
                user_id,
                &UpdateCredentials {
                    email: email.to_string(),
                    hashed_password,
                },
            )
            .await?
            .ok_or(CoreError::NotFound { entity: "user" })?;

        tracing::info!(user_id = %user.id, "User credentials updated");
        Ok(user)
    }

    fn hash_password(&self, password: &str) -> Result<String, CoreError> {
        self.hasher
            .hash(password)
            .map_err(|e| CoreError::internal(format!("Password hashing error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;
    use assert_matches::assert_matches;
    use chirpy_db::MemoryStore;

    const SECRET: &str = "session-test-secret";

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            access_token_ttl: Duration::hours(1),
            refresh_token_ttl: Duration::days(60),
            password_params: Params::new(8, 1, 1, None).unwrap(),
        }
    }

    fn service(store: &Arc<MemoryStore>) -> SessionService {
        SessionService::new(store.clone(), store.clone(), &auth_config())
    }

    async fn registered(store: &Arc<MemoryStore>) -> (SessionService, User) {
        let sessions = service(store);
        let user = sessions
            .register("walt@breakingbad.com", "123456")
            .await
            .unwrap();
        (sessions, user)
    }

    #[tokio::test]
    async fn test_login_validate_refresh_flow() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;

        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.refresh_token.user_id, user.id);
        assert_eq!(validate_access_token(&session.access_token, SECRET).unwrap(), user.id);

        let access = sessions.refresh(&session.refresh_token.token).await.unwrap();
        assert_eq!(validate_access_token(&access, SECRET).unwrap(), user.id);
        assert_eq!(sessions.authenticate(&access).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate_token() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();

        sessions.refresh(&session.refresh_token.token).await.unwrap();
        sessions.refresh(&session.refresh_token.token).await.unwrap();

        let rows = store.refresh_tokens_for(session.user.id).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expires_at, session.refresh_token.expires_at);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        assert_matches!(
            sessions.login("nobody@example.com", "123456").await,
            Err(CoreError::NotFound { entity: "user" })
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;
        assert_matches!(
            sessions.login("walt@breakingbad.com", "654321").await,
            Err(CoreError::Unauthorized(_))
        );
        assert!(store.refresh_tokens_for(user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_malformed_stored_hash_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(&CreateUser {
                email: "broken@example.com".into(),
                hashed_password: "not-a-phc-string".into(),
            })
            .await
            .unwrap();
        let sessions = service(&store);
        assert_matches!(
            sessions.login("broken@example.com", "anything").await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn test_login_fails_when_refresh_token_cannot_be_stored() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;
        store.set_fail_writes(true);

        assert_matches!(
            sessions.login("walt@breakingbad.com", "123456").await,
            Err(CoreError::Internal(_))
        );
        assert!(store.refresh_tokens_for(user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_oversized_refresh_ttl_fails_cleanly() {
        let store = Arc::new(MemoryStore::new());
        let config = AuthConfig {
            refresh_token_ttl: Duration::days(100_000_000),
            ..auth_config()
        };
        let sessions = SessionService::new(store.clone(), store.clone(), &config);
        let user = sessions.register("walt@breakingbad.com", "123456").await.unwrap();

        assert_matches!(
            sessions.login("walt@breakingbad.com", "123456").await,
            Err(CoreError::Internal(_))
        );
        assert!(store.refresh_tokens_for(user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_each_login_adds_a_usable_refresh_token() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;

        let first = sessions.login("walt@breakingbad.com", "123456").await.unwrap();
        let second = sessions.login("walt@breakingbad.com", "123456").await.unwrap();
        assert_ne!(first.refresh_token.token, second.refresh_token.token);

        assert_eq!(store.refresh_tokens_for(user.id).await.len(), 2);
        assert!(sessions.refresh(&first.refresh_token.token).await.is_ok());
        assert!(sessions.refresh(&second.refresh_token.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();

        sessions.revoke(&session.refresh_token.token).await.unwrap();
        assert!(session.refresh_token.expires_at > Utc::now());
        assert_matches!(
            sessions.refresh(&session.refresh_token.token).await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn test_refresh_with_expired_token_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;
        let now = Utc::now();
        store
            .insert_refresh_token(RefreshToken {
                token: "ab".repeat(32),
                user_id: user.id,
                created_at: now - Duration::days(61),
                updated_at: now - Duration::days(61),
                expires_at: now - Duration::days(1),
                revoked_at: None,
            })
            .await;

        assert_matches!(
            sessions.refresh(&"ab".repeat(32)).await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let sessions = service(&store);
        assert_matches!(
            sessions.refresh("deadbeef").await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn test_revoke_unknown_is_not_found_and_revoke_twice_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        assert_matches!(
            sessions.revoke("deadbeef").await,
            Err(CoreError::NotFound { .. })
        );

        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();
        sessions.revoke(&session.refresh_token.token).await.unwrap();
        sessions.revoke(&session.refresh_token.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        assert_matches!(
            sessions.register("walt@breakingbad.com", "other").await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn test_update_credentials() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;
        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();

        let updated = sessions
            .update_credentials(&session.access_token, "heisenberg@example.com", "newpass")
            .await
            .unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, "heisenberg@example.com");

        assert!(sessions.login("heisenberg@example.com", "newpass").await.is_ok());
        assert_matches!(
            sessions.login("walt@breakingbad.com", "123456").await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_update_credentials_rejects_refresh_token() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, _user) = registered(&store).await;
        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();

        assert_matches!(
            sessions
                .update_credentials(&session.refresh_token.token, "x@example.com", "p")
                .await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn test_update_credentials_for_removed_user_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (sessions, user) = registered(&store).await;
        let session = sessions.login("walt@breakingbad.com", "123456").await.unwrap();
        assert!(store.remove_user(user.id).await);

        assert_matches!(
            sessions
                .update_credentials(&session.access_token, "x@example.com", "p")
                .await,
            Err(CoreError::NotFound { entity: "user" })
        );
    }
}
