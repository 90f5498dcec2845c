use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::middleware::role::RequireAdmin;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    CreateMovieDto, DeletedMovieResponse, MovieFilterParams, MovieWithRelations,
    PaginatedMoviesResponse, UpdateMovieDto,
};
use super::service::MovieService;

#[utoipa::path(
    post,
    path = "/movie",
    request_body = CreateMovieDto,
    responses(
        (status = 201, description = "Movie created with its relations", body = MovieWithRelations),
        (status = 400, description = "Duplicate title or invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Director or genre not found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_movie(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateMovieDto>,
) -> Result<(StatusCode, Json<MovieWithRelations>), AppError> {
    let movie = MovieService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

#[utoipa::path(
    get,
    path = "/movie",
    params(MovieFilterParams),
    responses(
        (status = 200, description = "Cursor-paginated movie list", body = PaginatedMoviesResponse)
    ),
    tag = "Movies"
)]
#[instrument(skip(state))]
pub async fn get_movies(
    State(state): State<AppState>,
    Query(filters): Query<MovieFilterParams>,
) -> Result<Json<PaginatedMoviesResponse>, AppError> {
    let movies = MovieService::find_all(&state.db, filters).await?;
    Ok(Json(movies))
}

#[utoipa::path(
    get,
    path = "/movie/{id}",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie with relations", body = MovieWithRelations),
        (status = 404, description = "Movie not found")
    ),
    tag = "Movies"
)]
#[instrument(skip(state))]
pub async fn get_movie_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MovieWithRelations>, AppError> {
    let movie = MovieService::find_one(&state.db, id).await?;
    Ok(Json(movie))
}

#[utoipa::path(
    patch,
    path = "/movie/{id}",
    params(("id" = i64, Path, description = "Movie ID")),
    request_body = UpdateMovieDto,
    responses(
        (status = 200, description = "Movie updated", body = MovieWithRelations),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Movie, director or genre not found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_movie(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateMovieDto>,
) -> Result<Json<MovieWithRelations>, AppError> {
    let movie = MovieService::update(&state.db, id, dto).await?;
    Ok(Json(movie))
}

#[utoipa::path(
    delete,
    path = "/movie/{id}",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie deleted", body = DeletedMovieResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Movie not found")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_movie(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedMovieResponse>, AppError> {
    let id = MovieService::remove(&state.db, id).await?;
    Ok(Json(DeletedMovieResponse { id }))
}
