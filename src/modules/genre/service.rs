use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;

use super::model::{CreateGenreDto, Genre, UpdateGenreDto};

fn map_duplicate_name(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow::anyhow!("Genre with this name already exists"));
    }
    AppError::from(e)
}

pub struct GenreService;

impl GenreService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateGenreDto) -> Result<Genre, AppError> {
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name)
             VALUES ($1)
             RETURNING id, name, created_at, updated_at, version",
        )
        .bind(&dto.name)
        .fetch_one(db)
        .await
        .map_err(map_duplicate_name)?;

        Ok(genre)
    }

    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<Genre>, AppError> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT id, name, created_at, updated_at, version FROM genres ORDER BY id",
        )
        .fetch_all(db)
        .await?;

        Ok(genres)
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: i64) -> Result<Genre, AppError> {
        let genre = sqlx::query_as::<_, Genre>(
            "SELECT id, name, created_at, updated_at, version FROM genres WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        genre.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Genre not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: i64, dto: UpdateGenreDto) -> Result<Genre, AppError> {
        let genre = sqlx::query_as::<_, Genre>(
            "UPDATE genres
             SET name = $2, updated_at = NOW(), version = version + 1
             WHERE id = $1
             RETURNING id, name, created_at, updated_at, version",
        )
        .bind(id)
        .bind(&dto.name)
        .fetch_optional(db)
        .await
        .map_err(map_duplicate_name)?;

        genre.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Genre not found")))
    }

    #[instrument(skip(db))]
    pub async fn remove(db: &PgPool, id: i64) -> Result<i64, AppError> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Genre is still referenced by movies"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Genre not found")));
        }

        Ok(id)
    }
}
