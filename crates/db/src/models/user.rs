//! User entity model and DTOs.

use chirpy_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email.clone(),
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// DTO for creating a new user. The password must already be hashed.
pub struct CreateUser {
    pub email: String,
    pub hashed_password: String,
}

/// DTO for replacing a user's email and password hash.
pub struct UpdateCredentials {
    pub email: String,
    pub hashed_password: String,
}
