use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::User;
use super::service::UserService;

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::find_all(&state.db).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = UserService::find_one(&state.db, id).await?;
    Ok(Json(user))
}
