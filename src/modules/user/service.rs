use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;

use super::model::User;

const USER_COLUMNS: &str = "id, email, role, created_at, updated_at, version";

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: i64) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        user.ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::user::model::Role;

    async fn seed_user(pool: &PgPool, email: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, password) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind("$2b$04$placeholderhashvalue")
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_all_ordered_by_id(pool: PgPool) {
        let first = seed_user(&pool, "a@example.com").await;
        let second = seed_user(&pool, "b@example.com").await;

        let users = UserService::find_all(&pool).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, first);
        assert_eq!(users[1].id, second);
        assert_eq!(users[0].role, Role::User);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_one_not_found(pool: PgPool) {
        let result = UserService::find_one(&pool, 9999).await;
        assert!(result.is_err());
    }
}
