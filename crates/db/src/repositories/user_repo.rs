//! Repository for the `users` table.

use chirpy_core::types::UserId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateCredentials, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, hashed_password)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.hashed_password)
            .fetch_one(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's email and password hash.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_credentials(
        pool: &PgPool,
        id: UserId,
        input: &UpdateCredentials,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = $2,
                hashed_password = $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.hashed_password)
            .fetch_optional(pool)
            .await
    }
}
