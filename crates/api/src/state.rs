use std::sync::Arc;

use chirpy_db::{TokenStore, UserStore};

use crate::auth::session::SessionService;
use crate::config::AuthConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Login, refresh, revoke and credential-update operations.
    pub sessions: Arc<SessionService>,
}

impl AppState {
    /// Wire the session service to its persistence collaborators.
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenStore>, auth: &AuthConfig) -> Self {
        Self {
            sessions: Arc::new(SessionService::new(users, tokens, auth)),
        }
    }
}
