use sqlx::PgPool;
use tracing::instrument;

use crate::utils::errors::AppError;

use super::model::{CreateDirectorDto, Director, UpdateDirectorDto};

const DIRECTOR_COLUMNS: &str = "id, name, dob, nationality, created_at, updated_at, version";

pub struct DirectorService;

impl DirectorService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateDirectorDto) -> Result<Director, AppError> {
        let director = sqlx::query_as::<_, Director>(
            "INSERT INTO directors (name, dob, nationality)
             VALUES ($1, $2, $3)
             RETURNING id, name, dob, nationality, created_at, updated_at, version",
        )
        .bind(&dto.name)
        .bind(dto.dob)
        .bind(&dto.nationality)
        .fetch_one(db)
        .await?;

        Ok(director)
    }

    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<Director>, AppError> {
        let directors = sqlx::query_as::<_, Director>(&format!(
            "SELECT {} FROM directors ORDER BY id",
            DIRECTOR_COLUMNS
        ))
        .fetch_all(db)
        .await?;

        Ok(directors)
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: i64) -> Result<Director, AppError> {
        let director = sqlx::query_as::<_, Director>(&format!(
            "SELECT {} FROM directors WHERE id = $1",
            DIRECTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        director.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Director not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(db: &PgPool, id: i64, dto: UpdateDirectorDto) -> Result<Director, AppError> {
        // Presence check first so a missing id is a 404, not a no-op.
        Self::find_one(db, id).await?;

        let mut query = String::from("UPDATE directors SET updated_at = NOW(), version = version + 1");
        let mut param_count = 1;

        if dto.name.is_some() {
            param_count += 1;
            query.push_str(&format!(", name = ${}", param_count));
        }

        if dto.dob.is_some() {
            param_count += 1;
            query.push_str(&format!(", dob = ${}", param_count));
        }

        if dto.nationality.is_some() {
            param_count += 1;
            query.push_str(&format!(", nationality = ${}", param_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, dob, nationality, created_at, updated_at, version",
        );

        let mut query_builder = sqlx::query_as::<_, Director>(&query).bind(id);

        if let Some(name) = dto.name {
            query_builder = query_builder.bind(name);
        }

        if let Some(dob) = dto.dob {
            query_builder = query_builder.bind(dob);
        }

        if let Some(nationality) = dto.nationality {
            query_builder = query_builder.bind(nationality);
        }

        let director = query_builder.fetch_one(db).await?;

        Ok(director)
    }

    #[instrument(skip(db))]
    pub async fn remove(db: &PgPool, id: i64) -> Result<i64, AppError> {
        let result = sqlx::query("DELETE FROM directors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Director is still referenced by movies"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Director not found")));
        }

        Ok(id)
    }
}
