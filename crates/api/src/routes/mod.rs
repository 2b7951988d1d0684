pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// GET  /healthz     liveness and crate version
///
/// POST /login       login (public)
/// POST /refresh     new access token (Bearer refresh token)
/// POST /revoke      revoke refresh token (Bearer refresh token)
///
/// POST /users       register (public)
/// PUT  /users       update email + password (Bearer access token)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
}
