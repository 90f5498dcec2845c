//! PostgreSQL connection pool initialization.
//!
//! The database URL is read from the `DATABASE_URL` environment variable.
//! A missing variable or an unreachable database aborts startup.

use sqlx::PgPool;
use std::env;

/// Initializes the shared PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and lives in [`crate::state::AppState`]
/// for the lifetime of the process.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the connection fails.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
