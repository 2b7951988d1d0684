//! Persistence for users and refresh tokens.
//!
//! - [`models`] -- row types and DTOs.
//! - [`repositories`] -- zero-sized Postgres repositories.
//! - [`store`] -- the collaborator traits the auth layer depends on, plus the
//!   Postgres-backed [`PgStore`].
//! - [`memory`] -- an in-process [`MemoryStore`] for development and tests.

use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use store::{PgStore, StoreError, TokenStore, UserStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to make sure the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
