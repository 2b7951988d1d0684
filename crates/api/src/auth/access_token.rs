//! Stateless HS256 access tokens.
//!
//! Access tokens are never stored. Validation recomputes the MAC with the
//! shared secret and checks the claims against the current time, so the only
//! inputs are the token, the secret and a clock reading. Every validation
//! failure collapses to [`AccessTokenError::Invalid`]; the reason is only
//! logged at debug level.

use chirpy_core::error::CoreError;
use chirpy_core::types::{Timestamp, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim identifying this token class.
pub const ACCESS_TOKEN_ISSUER: &str = "access-token-class";

/// The only signing algorithm accepted on validation.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Default access token lifetime in seconds.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Always [`ACCESS_TOKEN_ISSUER`].
    pub iss: String,
    /// Subject -- the user's id.
    pub sub: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessTokenError {
    #[error("invalid access token")]
    Invalid,

    #[error("failed to sign access token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("access token expiry is out of range")]
    ExpiryOutOfRange,
}

impl From<AccessTokenError> for CoreError {
    fn from(err: AccessTokenError) -> Self {
        match err {
            AccessTokenError::Invalid => CoreError::unauthorized("Invalid or expired token"),
            AccessTokenError::Signing(e) => CoreError::internal(format!("Token generation error: {e}")),
            AccessTokenError::ExpiryOutOfRange => {
                CoreError::internal("Access token expiry is out of range")
            }
        }
    }
}

/// Issue an access token for `user_id` valid for `ttl` from now.
pub fn issue_access_token(
    user_id: UserId,
    secret: &str,
    ttl: Duration,
) -> Result<String, AccessTokenError> {
    issue_access_token_at(user_id, secret, ttl, Utc::now())
}

/// Issue an access token as if the current time were `now`.
pub fn issue_access_token_at(
    user_id: UserId,
    secret: &str,
    ttl: Duration,
    now: Timestamp,
) -> Result<String, AccessTokenError> {
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or(AccessTokenError::ExpiryOutOfRange)?;
    let claims = Claims {
        iss: ACCESS_TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(ACCESS_TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AccessTokenError::Signing)
}

/// Validate an access token against the current time and return its subject.
pub fn validate_access_token(token: &str, secret: &str) -> Result<UserId, AccessTokenError> {
    validate_access_token_at(token, secret, Utc::now())
}

/// Validate an access token as of `now` and return its subject.
///
/// Checks, in order: header algorithm is HS256 (before the key is used),
/// MAC, issuer, `now < exp` with no leeway, subject parses as a user id.
pub fn validate_access_token_at(
    token: &str,
    secret: &str,
    now: Timestamp,
) -> Result<UserId, AccessTokenError> {
    let header = decode_header(token).map_err(|e| reject("malformed token", &e))?;
    if header.alg != ACCESS_TOKEN_ALGORITHM {
        tracing::debug!(alg = ?header.alg, "Access token rejected: unexpected algorithm");
        return Err(AccessTokenError::Invalid);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| reject("signature or claims check failed", &e))?;
    let claims = token_data.claims;

    if claims.iss != ACCESS_TOKEN_ISSUER {
        tracing::debug!(iss = %claims.iss, "Access token rejected: wrong issuer");
        return Err(AccessTokenError::Invalid);
    }

    if now.timestamp() >= claims.exp {
        tracing::debug!(exp = claims.exp, "Access token rejected: expired");
        return Err(AccessTokenError::Invalid);
    }

    Uuid::parse_str(&claims.sub).map_err(|e| reject("subject is not a user id", &e))
}

fn validation() -> Validation {
    let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
    // Expiry is compared against the caller's clock in `validate_access_token_at`.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation
}

fn reject(reason: &'static str, err: &dyn std::fmt::Display) -> AccessTokenError {
    tracing::debug!(reason, error = %err, "Access token rejected");
    AccessTokenError::Invalid
}
