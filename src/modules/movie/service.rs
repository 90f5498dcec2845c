use std::collections::{BTreeSet, HashMap, HashSet};

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::modules::genre::model::Genre;
use crate::utils::errors::AppError;
use crate::utils::pagination::CursorMeta;
use crate::utils::tx::with_transaction;

use super::model::{
    CreateMovieDto, Movie, MovieFilterParams, MovieRelationsRow, MovieWithRelations,
    PaginatedMoviesResponse, UpdateMovieDto,
};

const MOVIE_RELATIONS_SELECT: &str = "
SELECT
    m.id, m.title, m.like_count, m.created_at, m.updated_at, m.version,
    md.id AS detail_id, md.detail,
    d.id AS director_id, d.name AS director_name, d.dob AS director_dob,
    d.nationality AS director_nationality, d.created_at AS director_created_at,
    d.updated_at AS director_updated_at, d.version AS director_version
FROM movies m
INNER JOIN movie_details md ON md.id = m.detail_id
INNER JOIN directors d ON d.id = m.director_id";

fn map_duplicate_title(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow::anyhow!("Movie with this title already exists"));
    }
    AppError::from(e)
}

/// Dedupes the requested genre ids; membership is a set.
fn normalize_genre_ids(ids: &[i64]) -> Vec<i64> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Resolves every id to an existing genre or fails the whole set,
/// reporting which ids did resolve so the caller can spot the bad ones.
async fn resolve_genres(
    tx: &mut Transaction<'static, Postgres>,
    ids: &[i64],
) -> Result<Vec<Genre>, AppError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let genres = sqlx::query_as::<_, Genre>(
        "SELECT id, name, created_at, updated_at, version FROM genres WHERE id = ANY($1) ORDER BY id",
    )
    .bind(ids)
    .fetch_all(&mut **tx)
    .await?;

    if genres.len() != ids.len() {
        let found: Vec<i64> = genres.iter().map(|g| g.id).collect();
        return Err(AppError::not_found(anyhow::anyhow!(
            "Some genres do not exist. Existing ids: {:?}",
            found
        )));
    }

    Ok(genres)
}

async fn ensure_director_exists(
    tx: &mut Transaction<'static, Postgres>,
    id: i64,
) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM directors WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

    if !exists {
        return Err(AppError::not_found(anyhow::anyhow!("Director not found")));
    }

    Ok(())
}

pub struct MovieService;

impl MovieService {
    #[instrument(skip(db))]
    pub async fn find_all(
        db: &PgPool,
        filters: MovieFilterParams,
    ) -> Result<PaginatedMoviesResponse, AppError> {
        let limit = filters.pagination.limit();
        let after = filters.pagination.after();

        // One extra row tells us whether another page exists.
        let mut rows = if let Some(title) = &filters.title {
            sqlx::query_as::<_, MovieRelationsRow>(&format!(
                "{} WHERE m.id > $1 AND m.title LIKE $2 ORDER BY m.id LIMIT $3",
                MOVIE_RELATIONS_SELECT
            ))
            .bind(after)
            .bind(format!("%{}%", title))
            .bind(limit + 1)
            .fetch_all(db)
            .await?
        } else {
            sqlx::query_as::<_, MovieRelationsRow>(&format!(
                "{} WHERE m.id > $1 ORDER BY m.id LIMIT $2",
                MOVIE_RELATIONS_SELECT
            ))
            .bind(after)
            .bind(limit + 1)
            .fetch_all(db)
            .await?
        };

        let meta = CursorMeta::paginate(&mut rows, limit, |row| row.id);

        let movie_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut genre_map = Self::load_genre_sets(db, &movie_ids).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let genres = genre_map.remove(&row.id).unwrap_or_default();
                row.into_movie(genres)
            })
            .collect();

        Ok(PaginatedMoviesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: i64) -> Result<MovieWithRelations, AppError> {
        let row = sqlx::query_as::<_, MovieRelationsRow>(&format!(
            "{} WHERE m.id = $1",
            MOVIE_RELATIONS_SELECT
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        let row = row.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Movie not found")))?;

        let mut genre_map = Self::load_genre_sets(db, &[row.id]).await?;
        let genres = genre_map.remove(&row.id).unwrap_or_default();

        Ok(row.into_movie(genres))
    }

    /// Creates the detail, the movie and its genre links in one
    /// transaction. Reference resolution happens inside the transaction
    /// boundary, so a bad director or genre id can never leave partial
    /// rows behind.
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateMovieDto) -> Result<MovieWithRelations, AppError> {
        let movie_id = with_transaction(db, move |tx| {
            Box::pin(async move {
                ensure_director_exists(tx, dto.director_id).await?;

                let genre_ids = normalize_genre_ids(&dto.genre_ids);
                let genres = resolve_genres(tx, &genre_ids).await?;

                let detail_id = sqlx::query_scalar::<_, i64>(
                    "INSERT INTO movie_details (detail) VALUES ($1) RETURNING id",
                )
                .bind(&dto.detail)
                .fetch_one(&mut **tx)
                .await?;

                let movie_id = sqlx::query_scalar::<_, i64>(
                    "INSERT INTO movies (title, director_id, detail_id)
                     VALUES ($1, $2, $3)
                     RETURNING id",
                )
                .bind(&dto.title)
                .bind(dto.director_id)
                .bind(detail_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(map_duplicate_title)?;

                for genre in &genres {
                    sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2)")
                        .bind(movie_id)
                        .bind(genre.id)
                        .execute(&mut **tx)
                        .await?;
                }

                Ok(movie_id)
            })
        })
        .await?;

        Self::find_one(db, movie_id).await
    }

    /// Applies scalar changes, an optional director change, an in-place
    /// detail update and a genre-set replacement in one transaction. The
    /// genre replacement is applied as a symmetric difference; unchanged
    /// memberships are left untouched.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: i64,
        dto: UpdateMovieDto,
    ) -> Result<MovieWithRelations, AppError> {
        with_transaction(db, move |tx| {
            Box::pin(async move {
                let movie = sqlx::query_as::<_, Movie>(
                    "SELECT id, title, like_count, director_id, detail_id,
                            created_at, updated_at, version
                     FROM movies WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Movie not found")))?;

                if let Some(director_id) = dto.director_id {
                    ensure_director_exists(tx, director_id).await?;
                }

                let new_genres = match &dto.genre_ids {
                    Some(ids) => Some(resolve_genres(tx, &normalize_genre_ids(ids)).await?),
                    None => None,
                };

                let mut query =
                    String::from("UPDATE movies SET updated_at = NOW(), version = version + 1");
                let mut param_count = 1;

                if dto.title.is_some() {
                    param_count += 1;
                    query.push_str(&format!(", title = ${}", param_count));
                }

                if dto.director_id.is_some() {
                    param_count += 1;
                    query.push_str(&format!(", director_id = ${}", param_count));
                }

                query.push_str(" WHERE id = $1");

                let mut query_builder = sqlx::query(&query).bind(id);

                if let Some(title) = dto.title {
                    query_builder = query_builder.bind(title);
                }

                if let Some(director_id) = dto.director_id {
                    query_builder = query_builder.bind(director_id);
                }

                query_builder
                    .execute(&mut **tx)
                    .await
                    .map_err(map_duplicate_title)?;

                // The detail keeps its identity; only the text changes.
                if let Some(detail) = dto.detail {
                    sqlx::query("UPDATE movie_details SET detail = $2 WHERE id = $1")
                        .bind(movie.detail_id)
                        .bind(detail)
                        .execute(&mut **tx)
                        .await?;
                }

                if let Some(genres) = new_genres {
                    let current: HashSet<i64> = sqlx::query_scalar::<_, i64>(
                        "SELECT genre_id FROM movie_genres WHERE movie_id = $1",
                    )
                    .bind(id)
                    .fetch_all(&mut **tx)
                    .await?
                    .into_iter()
                    .collect();

                    let next: HashSet<i64> = genres.iter().map(|g| g.id).collect();

                    let to_remove: Vec<i64> = current.difference(&next).copied().collect();
                    let to_add: Vec<i64> = next.difference(&current).copied().collect();

                    if !to_remove.is_empty() {
                        sqlx::query(
                            "DELETE FROM movie_genres WHERE movie_id = $1 AND genre_id = ANY($2)",
                        )
                        .bind(id)
                        .bind(&to_remove[..])
                        .execute(&mut **tx)
                        .await?;
                    }

                    for genre_id in to_add {
                        sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2)")
                            .bind(id)
                            .bind(genre_id)
                            .execute(&mut **tx)
                            .await?;
                    }
                }

                Ok(())
            })
        })
        .await?;

        Self::find_one(db, id).await
    }

    /// Deletes the movie and its owned detail together; the genre links go
    /// with the movie row via the join table's cascade.
    #[instrument(skip(db))]
    pub async fn remove(db: &PgPool, id: i64) -> Result<i64, AppError> {
        with_transaction(db, move |tx| {
            Box::pin(async move {
                let detail_id = sqlx::query_scalar::<_, i64>(
                    "SELECT detail_id FROM movies WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Movie not found")))?;

                sqlx::query("DELETE FROM movies WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                sqlx::query("DELETE FROM movie_details WHERE id = $1")
                    .bind(detail_id)
                    .execute(&mut **tx)
                    .await?;

                Ok(id)
            })
        })
        .await
    }

    async fn load_genre_sets(
        db: &PgPool,
        movie_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Genre>>, AppError> {
        #[derive(sqlx::FromRow)]
        struct MovieGenreRow {
            movie_id: i64,
            id: i64,
            name: String,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
            version: i32,
        }

        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, MovieGenreRow>(
            "SELECT mg.movie_id, g.id, g.name, g.created_at, g.updated_at, g.version
             FROM movie_genres mg
             INNER JOIN genres g ON g.id = mg.genre_id
             WHERE mg.movie_id = ANY($1)
             ORDER BY mg.movie_id, g.id",
        )
        .bind(movie_ids)
        .fetch_all(db)
        .await?;

        let mut map: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            map.entry(row.movie_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
                updated_at: row.updated_at,
                version: row.version,
            });
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::pagination::CursorPaginationParams;
    use chrono::NaiveDate;

    async fn seed_director(pool: &PgPool, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO directors (name, dob, nationality) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(NaiveDate::from_ymd_opt(1960, 1, 1).unwrap())
        .bind("Korean")
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_genre(pool: &PgPool, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("INSERT INTO genres (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn create_dto(title: &str, director_id: i64, genre_ids: Vec<i64>) -> CreateMovieDto {
        CreateMovieDto {
            title: title.to_string(),
            detail: format!("About {}", title),
            director_id,
            genre_ids,
        }
    }

    fn empty_update() -> UpdateMovieDto {
        UpdateMovieDto {
            title: None,
            detail: None,
            director_id: None,
            genre_ids: None,
        }
    }

    async fn table_counts(pool: &PgPool) -> (i64, i64, i64) {
        let movies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(pool)
            .await
            .unwrap();
        let details = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie_details")
            .fetch_one(pool)
            .await
            .unwrap();
        let links = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movie_genres")
            .fetch_one(pool)
            .await
            .unwrap();
        (movies, details, links)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_movie_with_relations(pool: PgPool) {
        let director_id = seed_director(&pool, "Bong Joon-ho").await;
        let fantasy = seed_genre(&pool, "fantasy").await;
        let thriller = seed_genre(&pool, "thriller").await;

        let movie = MovieService::create(
            &pool,
            create_dto("Parasite", director_id, vec![thriller, fantasy]),
        )
        .await
        .unwrap();

        assert_eq!(movie.title, "Parasite");
        assert_eq!(movie.like_count, 0);
        assert_eq!(movie.director.id, director_id);
        assert_eq!(movie.detail.detail, "About Parasite");

        let mut genre_ids: Vec<i64> = movie.genres.iter().map(|g| g.id).collect();
        genre_ids.sort();
        let mut expected = vec![fantasy, thriller];
        expected.sort();
        assert_eq!(genre_ids, expected);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_movie_dedupes_genres(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;
        let fantasy = seed_genre(&pool, "fantasy").await;

        let movie = MovieService::create(
            &pool,
            create_dto("Twice", director_id, vec![fantasy, fantasy]),
        )
        .await
        .unwrap();

        assert_eq!(movie.genres.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_movie_director_not_found(pool: PgPool) {
        let result = MovieService::create(&pool, create_dto("Orphan", 9999, vec![])).await;
        assert!(result.is_err());

        assert_eq!(table_counts(&pool).await, (0, 0, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_movie_unknown_genre_rolls_back(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;
        let fantasy = seed_genre(&pool, "fantasy").await;

        let result =
            MovieService::create(&pool, create_dto("X", director_id, vec![fantasy, 9999])).await;

        let err = result.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
        // The resolved ids are reported back.
        assert!(err.error.to_string().contains(&fantasy.to_string()));

        // Nothing committed: no movie, detail or association rows.
        assert_eq!(table_counts(&pool).await, (0, 0, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_movie_duplicate_title(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;

        MovieService::create(&pool, create_dto("Same Title", director_id, vec![]))
            .await
            .unwrap();

        let result = MovieService::create(&pool, create_dto("Same Title", director_id, vec![])).await;

        let err = result.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        // The duplicate's detail row was rolled back with everything else.
        assert_eq!(table_counts(&pool).await, (1, 1, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_all_cursor_pagination(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;

        for title in ["Alpha", "Beta", "Gamma"] {
            MovieService::create(&pool, create_dto(title, director_id, vec![]))
                .await
                .unwrap();
        }

        let first_page = MovieService::find_all(
            &pool,
            MovieFilterParams {
                title: None,
                pagination: CursorPaginationParams {
                    cursor: None,
                    limit: Some(2),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(first_page.data.len(), 2);
        assert!(first_page.meta.has_more);
        let next_cursor = first_page.meta.next_cursor.unwrap();
        assert_eq!(next_cursor, first_page.data[1].id);

        let second_page = MovieService::find_all(
            &pool,
            MovieFilterParams {
                title: None,
                pagination: CursorPaginationParams {
                    cursor: Some(next_cursor),
                    limit: Some(2),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(second_page.data.len(), 1);
        assert!(!second_page.meta.has_more);
        assert_eq!(second_page.meta.next_cursor, None);
        assert_eq!(second_page.data[0].title, "Gamma");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_all_title_filter(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;

        for title in ["The Matrix", "The Matrix Reloaded", "Inception"] {
            MovieService::create(&pool, create_dto(title, director_id, vec![]))
                .await
                .unwrap();
        }

        let page = MovieService::find_all(
            &pool,
            MovieFilterParams {
                title: Some("Matrix".to_string()),
                pagination: CursorPaginationParams {
                    cursor: None,
                    limit: Some(10),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|m| m.title.contains("Matrix")));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_one_not_found(pool: PgPool) {
        let result = MovieService::find_one(&pool, 9999).await;
        assert!(result.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_scalar_fields_and_director(pool: PgPool) {
        let director_id = seed_director(&pool, "First").await;
        let other_director_id = seed_director(&pool, "Second").await;

        let movie = MovieService::create(&pool, create_dto("Before", director_id, vec![]))
            .await
            .unwrap();

        let updated = MovieService::update(
            &pool,
            movie.id,
            UpdateMovieDto {
                title: Some("After".to_string()),
                detail: Some("New detail text".to_string()),
                director_id: Some(other_director_id),
                genre_ids: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "After");
        assert_eq!(updated.director.id, other_director_id);
        assert_eq!(updated.detail.detail, "New detail text");
        // The detail row is updated in place, never replaced.
        assert_eq!(updated.detail.id, movie.detail.id);
        assert_eq!(updated.version, movie.version + 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_genre_set_symmetric_difference(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;
        let g1 = seed_genre(&pool, "one").await;
        let g2 = seed_genre(&pool, "two").await;
        let g3 = seed_genre(&pool, "three").await;

        let movie = MovieService::create(&pool, create_dto("Diff", director_id, vec![g1, g2]))
            .await
            .unwrap();

        let updated = MovieService::update(
            &pool,
            movie.id,
            UpdateMovieDto {
                genre_ids: Some(vec![g2, g3]),
                ..empty_update()
            },
        )
        .await
        .unwrap();

        let mut ids: Vec<i64> = updated.genres.iter().map(|g| g.id).collect();
        ids.sort();
        let mut expected = vec![g2, g3];
        expected.sort();
        assert_eq!(ids, expected);

        let links: Vec<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT genre_id FROM movie_genres WHERE movie_id = $1 ORDER BY genre_id",
        )
        .bind(movie.id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(links, {
            let mut v = vec![g2, g3];
            v.sort();
            v
        });
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_unknown_genre_rolls_back_everything(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;
        let g1 = seed_genre(&pool, "one").await;

        let movie = MovieService::create(&pool, create_dto("Stable", director_id, vec![g1]))
            .await
            .unwrap();

        let result = MovieService::update(
            &pool,
            movie.id,
            UpdateMovieDto {
                title: Some("Should Not Stick".to_string()),
                genre_ids: Some(vec![g1, 9999]),
                ..empty_update()
            },
        )
        .await;

        assert!(result.is_err());

        let reloaded = MovieService::find_one(&pool, movie.id).await.unwrap();
        assert_eq!(reloaded.title, "Stable");
        assert_eq!(reloaded.genres.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_not_found(pool: PgPool) {
        let result = MovieService::update(
            &pool,
            9999,
            UpdateMovieDto {
                title: Some("Ghost".to_string()),
                ..empty_update()
            },
        )
        .await;

        assert!(result.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_deletes_movie_and_detail(pool: PgPool) {
        let director_id = seed_director(&pool, "Director").await;
        let g1 = seed_genre(&pool, "one").await;

        let movie = MovieService::create(&pool, create_dto("Doomed", director_id, vec![g1]))
            .await
            .unwrap();

        let deleted_id = MovieService::remove(&pool, movie.id).await.unwrap();
        assert_eq!(deleted_id, movie.id);

        assert_eq!(table_counts(&pool).await, (0, 0, 0));

        // Associated entities survive the movie.
        let genre_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genres")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(genre_count, 1);

        let result = MovieService::find_one(&pool, movie.id).await;
        assert!(result.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_remove_not_found(pool: PgPool) {
        let result = MovieService::remove(&pool, 9999).await;
        assert!(result.is_err());
    }
}
