use anyhow::anyhow;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::{AuthUser, RefreshUser};
use crate::modules::user::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::{AccessTokenResponse, TokenPairResponse};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

fn authorization_header(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request(anyhow!("Missing authorization header")))
}

/// Register a new user from a `Basic base64(email:password)` header.
#[utoipa::path(
    post,
    path = "/auth/register",
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Malformed header or email already registered", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers))]
pub async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<User>), AppError> {
    let raw_token = authorization_header(&headers)?;
    let user = AuthService::register(&state.db, raw_token, &state.security_config).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with a `Basic base64(email:password)` header; returns an access
/// and a refresh token.
#[utoipa::path(
    post,
    path = "/auth/login",
    responses(
        (status = 200, description = "Login successful", body = TokenPairResponse),
        (status = 400, description = "Malformed header or invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers))]
pub async fn login_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenPairResponse>, AppError> {
    let raw_token = authorization_header(&headers)?;
    let tokens = AuthService::login(&state.db, raw_token, &state.jwt_config).await?;
    Ok(Json(tokens))
}

/// Exchange a verified refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/auth/token/access",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 403, description = "Missing or non-refresh token", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn rotate_access_token(
    State(state): State<AppState>,
    RefreshUser(claims): RefreshUser,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let response = AuthService::rotate_access_token(&claims, &state.jwt_config)?;
    Ok(Json(response))
}

/// Current authenticated user.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 403, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = AuthService::me(&state.db, auth_user.user_id()).await?;
    Ok(Json(user))
}
