use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::director::model::Director;
use crate::modules::genre::model::Genre;
use crate::utils::pagination::{CursorMeta, CursorPaginationParams};

/// Bare movie row. Relations live on [`MovieWithRelations`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub like_count: i64,
    pub director_id: i64,
    pub detail_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MovieDetail {
    pub id: i64,
    pub detail: String,
}

/// A movie with its director, detail and genre set loaded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieWithRelations {
    pub id: i64,
    pub title: String,
    pub like_count: i64,
    pub detail: MovieDetail,
    pub director: Director,
    pub genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Flat row produced by the movie + detail + director join. The aliased
/// director columns are regrouped into [`MovieWithRelations`] once the
/// genre sets have been fetched.
#[derive(Debug, FromRow)]
pub struct MovieRelationsRow {
    pub id: i64,
    pub title: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
    pub detail_id: i64,
    pub detail: String,
    pub director_id: i64,
    pub director_name: String,
    pub director_dob: NaiveDate,
    pub director_nationality: String,
    pub director_created_at: DateTime<Utc>,
    pub director_updated_at: DateTime<Utc>,
    pub director_version: i32,
}

impl MovieRelationsRow {
    pub fn into_movie(self, genres: Vec<Genre>) -> MovieWithRelations {
        MovieWithRelations {
            id: self.id,
            title: self.title,
            like_count: self.like_count,
            detail: MovieDetail {
                id: self.detail_id,
                detail: self.detail,
            },
            director: Director {
                id: self.director_id,
                name: self.director_name,
                dob: self.director_dob,
                nationality: self.director_nationality,
                created_at: self.director_created_at,
                updated_at: self.director_updated_at,
                version: self.director_version,
            },
            genres,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMovieDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub detail: String,
    pub director_id: i64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMovieDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub detail: Option<String>,
    pub director_id: Option<i64>,
    /// Full replacement of the genre set when present.
    pub genre_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct MovieFilterParams {
    /// Substring match against the title.
    pub title: Option<String>,
    #[serde(flatten)]
    pub pagination: CursorPaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedMoviesResponse {
    pub data: Vec<MovieWithRelations>,
    pub meta: CursorMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedMovieResponse {
    pub id: i64,
}
