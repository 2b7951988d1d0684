//! Handlers for the `/users` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chirpy_db::models::user::UserResponse;

use crate::error::AppResult;
use crate::handlers::auth::CredentialsRequest;
use crate::middleware::auth::BearerToken;
use crate::state::AppState;

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(input) = payload?;
    let user = state.sessions.register(&input.email, &input.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /api/users
///
/// Replaces the email and password of the user the access token belongs to.
pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    // Token problems win over body problems.
    state.sessions.authenticate(&access_token)?;
    let Json(input) = payload?;

    let user = state
        .sessions
        .update_credentials(&access_token, &input.email, &input.password)
        .await?;
    Ok(Json(UserResponse::from(&user)))
}
