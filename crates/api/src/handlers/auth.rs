//! Handlers for login, refresh and revoke.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chirpy_db::models::user::UserResponse;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::BearerToken;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/login`, `POST /api/users` and `PUT /api/users`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the user's public fields plus both tokens.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Response body for `POST /api/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/login
///
/// 404 for an unknown email, 401 for a wrong password.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(input) = payload?;
    let session = state.sessions.login(&input.email, &input.password).await?;

    Ok(Json(LoginResponse {
        user: UserResponse::from(&session.user),
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Takes the refresh token from `Authorization: Bearer` and returns a new
/// access token.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> AppResult<Json<RefreshResponse>> {
    let token = state.sessions.refresh(&refresh_token).await?;
    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> AppResult<StatusCode> {
    state.sessions.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
