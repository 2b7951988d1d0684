use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use argon2::Params;
use axum::http::HeaderValue;
use chrono::Duration;

use crate::auth::access_token::DEFAULT_ACCESS_TOKEN_TTL_SECS;
use crate::auth::refresh::DEFAULT_REFRESH_TOKEN_TTL_DAYS;

/// Longest accepted access-token lifetime (30 days).
const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Longest accepted refresh-token lifetime (10 years).
const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub auth: AuthConfig,
}

/// Secrets and lifetimes for the session subsystem.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Must be stable across restarts.
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Argon2id cost parameters for new password hashes.
    pub password_params: Params,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_params", &self.password_params)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    ///
    /// Invalid values are reported as errors rather than panics.
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 8080)?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            auth: AuthConfig::from_env()?,
        })
    }
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `ACCESS_TOKEN_TTL_SECS`  | no       | `3600`  |
    /// | `REFRESH_TOKEN_TTL_DAYS` | no       | `60`    |
    /// | `ARGON2_M_COST`          | no       | `19456` |
    /// | `ARGON2_T_COST`          | no       | `2`     |
    /// | `ARGON2_P_COST`          | no       | `1`     |
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET must be set in the environment")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let access_token_ttl_secs: i64 =
            env_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl_days: i64 =
            env_or("REFRESH_TOKEN_TTL_DAYS", DEFAULT_REFRESH_TOKEN_TTL_DAYS)?;
        let access_token_ttl = ttl_within(
            "ACCESS_TOKEN_TTL_SECS",
            access_token_ttl_secs,
            MAX_ACCESS_TOKEN_TTL_SECS,
            Duration::try_seconds,
        )?;
        let refresh_token_ttl = ttl_within(
            "REFRESH_TOKEN_TTL_DAYS",
            refresh_token_ttl_days,
            MAX_REFRESH_TOKEN_TTL_DAYS,
            Duration::try_days,
        )?;

        let password_params = Params::new(
            env_or("ARGON2_M_COST", Params::DEFAULT_M_COST)?,
            env_or("ARGON2_T_COST", Params::DEFAULT_T_COST)?,
            env_or("ARGON2_P_COST", Params::DEFAULT_P_COST)?,
            None,
        )
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

        Ok(Self {
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            password_params,
        })
    }
}

/// Convert a lifetime setting, rejecting values outside `1..=max`.
fn ttl_within(
    key: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> anyhow::Result<Duration> {
    if !(1..=max).contains(&value) {
        bail!("{key} must be between 1 and {max}, got {value}");
    }
    to_duration(value).ok_or_else(|| anyhow!("{key} is out of range: {value}"))
}

/// Read `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value '{value}': {e}")),
    }
}
