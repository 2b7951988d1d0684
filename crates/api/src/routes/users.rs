use axum::routing::post;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User routes, mounted directly under `/api`.
///
/// ```text
/// POST /users  -> create_user
/// PUT  /users  -> update_user (requires access token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users", post(users::create_user).put(users::update_user))
}
