//! `Authorization: Bearer` extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::credentials::extract_bearer;
use crate::error::AppError;

/// Raw token taken from an `Authorization: Bearer <token>` header.
///
/// The extractor only parses the header. Whether the value is an access token
/// or a refresh token is up to the handler:
///
/// ```ignore
/// async fn my_handler(State(state): State<AppState>, BearerToken(token): BearerToken) -> AppResult<()> {
///     let user_id = state.sessions.authenticate(&token)?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(extract_bearer(&parts.headers)?))
    }
}
