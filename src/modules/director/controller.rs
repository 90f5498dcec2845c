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

use super::model::{CreateDirectorDto, DeletedDirectorResponse, Director, UpdateDirectorDto};
use super::service::DirectorService;

#[utoipa::path(
    post,
    path = "/director",
    request_body = CreateDirectorDto,
    responses(
        (status = 201, description = "Director created", body = Director),
        (status = 403, description = "Forbidden")
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_director(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDirectorDto>,
) -> Result<(StatusCode, Json<Director>), AppError> {
    let director = DirectorService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(director)))
}

#[utoipa::path(
    get,
    path = "/director",
    responses(
        (status = 200, description = "All directors", body = Vec<Director>),
        (status = 403, description = "Forbidden")
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_directors(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Director>>, AppError> {
    let directors = DirectorService::find_all(&state.db).await?;
    Ok(Json(directors))
}

#[utoipa::path(
    get,
    path = "/director/{id}",
    params(("id" = i64, Path, description = "Director ID")),
    responses(
        (status = 200, description = "Director details", body = Director),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Director not found")
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_director_by_id(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Director>, AppError> {
    let director = DirectorService::find_one(&state.db, id).await?;
    Ok(Json(director))
}

#[utoipa::path(
    patch,
    path = "/director/{id}",
    params(("id" = i64, Path, description = "Director ID")),
    request_body = UpdateDirectorDto,
    responses(
        (status = 200, description = "Director updated", body = Director),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Director not found")
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_director(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateDirectorDto>,
) -> Result<Json<Director>, AppError> {
    let director = DirectorService::update(&state.db, id, dto).await?;
    Ok(Json(director))
}

#[utoipa::path(
    delete,
    path = "/director/{id}",
    params(("id" = i64, Path, description = "Director ID")),
    responses(
        (status = 200, description = "Director deleted", body = DeletedDirectorResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Director not found")
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_director(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedDirectorResponse>, AppError> {
    let id = DirectorService::remove(&state.db, id).await?;
    Ok(Json(DeletedDirectorResponse { id }))
}
