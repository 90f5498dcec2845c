use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{CreateGenreDto, DeletedGenreResponse, Genre, UpdateGenreDto};
use super::service::GenreService;

#[utoipa::path(
    post,
    path = "/genre",
    request_body = CreateGenreDto,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Duplicate genre name"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Genres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_genre(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateGenreDto>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    let genre = GenreService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

#[utoipa::path(
    get,
    path = "/genre",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>),
        (status = 403, description = "Forbidden")
    ),
    tag = "Genres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_genres(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Genre>>, AppError> {
    let genres = GenreService::find_all(&state.db).await?;
    Ok(Json(genres))
}

#[utoipa::path(
    get,
    path = "/genre/{id}",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Genre not found")
    ),
    tag = "Genres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_genre_by_id(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Genre>, AppError> {
    let genre = GenreService::find_one(&state.db, id).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    patch,
    path = "/genre/{id}",
    params(("id" = i64, Path, description = "Genre ID")),
    request_body = UpdateGenreDto,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Genre not found")
    ),
    tag = "Genres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_genre(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateGenreDto>,
) -> Result<Json<Genre>, AppError> {
    let genre = GenreService::update(&state.db, id, dto).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    delete,
    path = "/genre/{id}",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre deleted", body = DeletedGenreResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Genre not found")
    ),
    tag = "Genres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_genre(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedGenreResponse>, AppError> {
    let id = GenreService::remove(&state.db, id).await?;
    Ok(Json(DeletedGenreResponse { id }))
}
