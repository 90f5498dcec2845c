//! Scoped database transactions.

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

use crate::utils::errors::AppError;

/// Runs `op` inside a transaction: commit on `Ok`, rollback on `Err`.
///
/// The connection is returned to the pool on every exit path, including
/// early returns out of `op` via `?`.
///
/// ```ignore
/// let id = with_transaction(&pool, |tx| {
///     Box::pin(async move {
///         sqlx::query("...").execute(&mut **tx).await?;
///         Ok(42)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<T, F>(pool: &PgPool, op: F) -> Result<T, AppError>
where
    F: for<'t> FnOnce(&'t mut Transaction<'static, Postgres>) -> BoxFuture<'t, Result<T, AppError>>,
{
    let mut tx = pool.begin().await?;

    match op(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback().await?;
            Err(err)
        }
    }
}
