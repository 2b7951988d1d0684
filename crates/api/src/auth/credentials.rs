//! `Authorization` header parsing.
//!
//! Two schemes are understood: `Bearer <token>` for session tokens and
//! `ApiKey <key>` for service-to-service calls. Which one an endpoint expects
//! is fixed by the endpoint, never sniffed from the header.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

pub const BEARER_SCHEME: &str = "bearer";
pub const API_KEY_SCHEME: &str = "apikey";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Malformed Authorization header")]
    MalformedHeader,
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, BEARER_SCHEME)
}

/// Extract the key from `Authorization: ApiKey <key>`, whitespace-trimmed.
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, API_KEY_SCHEME)
}

fn extract_credential(headers: &HeaderMap, scheme: &str) -> Result<String, CredentialError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::MissingHeader)?
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader)?;

    if raw.trim().is_empty() {
        return Err(CredentialError::MissingHeader);
    }

    let (given, rest) = raw
        .split_once(' ')
        .ok_or(CredentialError::MalformedHeader)?;
    if !given.eq_ignore_ascii_case(scheme) {
        return Err(CredentialError::MalformedHeader);
    }

    let credential = rest.trim();
    if credential.is_empty() {
        return Err(CredentialError::MalformedHeader);
    }
    Ok(credential.to_string())
}
