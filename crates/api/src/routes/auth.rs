//! Route definitions for login, refresh and revoke.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Session routes, mounted directly under `/api`.
///
/// ```text
/// POST /login    -> login
/// POST /refresh  -> refresh
/// POST /revoke   -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
}
