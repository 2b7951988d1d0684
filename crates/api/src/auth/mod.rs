//! Credential and session-token primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`access_token`] -- stateless HS256 access tokens.
//! - [`refresh`] -- stateful opaque refresh tokens.
//! - [`credentials`] -- `Authorization` header parsing.
//! - [`session`] -- login / refresh / revoke / credential-update orchestration.

pub mod access_token;
pub mod credentials;
pub mod password;
pub mod refresh;
pub mod session;
