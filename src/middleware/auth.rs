//! Bearer-token middleware and the authentication gates.
//!
//! The middleware runs on every request and never rejects: it attempts to
//! verify an Authorization header and, on success, stores the [`Claims`]
//! in the request extensions. Deciding whether a request is allowed is
//! left entirely to the route's gates ([`AuthUser`], [`RefreshUser`] and
//! the role layer in [`super::role`]), so public routes stay reachable
//! with a missing, expired or garbage token.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{Claims, TokenType};
use crate::state::AppState;
use crate::utils::credentials::extract_bearer_token;
use crate::utils::errors::AppError;
use crate::utils::jwt::{peek_token_type, verify_token};

/// Attempts to authenticate the request. Verification failures are
/// swallowed; the request continues unauthenticated either way.
pub async fn bearer_token_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if let Some(raw) = header_value
        && let Ok(claims) = decode_request_claims(&raw, &state.jwt_config)
    {
        req.extensions_mut().insert(claims);
    }

    next.run(req).await
}

/// Strips the scheme, peeks the type tag to choose the secret, then runs
/// the full verification.
fn decode_request_claims(raw: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let token = extract_bearer_token(raw)?;
    let token_type = peek_token_type(token)?;

    verify_token(token, token_type == TokenType::Refresh, jwt_config)
}

/// Gate for protected routes: requires verified claims of type `access`.
/// Refresh tokens may not authorize access to protected resources.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.0.sub
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = require_claims(parts, TokenType::Access)?;
        Ok(AuthUser(claims))
    }
}

/// Gate for the token-rotation route: requires claims of type `refresh`.
#[derive(Debug, Clone)]
pub struct RefreshUser(pub Claims);

impl<S> FromRequestParts<S> for RefreshUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = require_claims(parts, TokenType::Refresh)?;
        Ok(RefreshUser(claims))
    }
}

fn require_claims(parts: &Parts, expected: TokenType) -> Result<Claims, AppError> {
    let claims = parts
        .extensions
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::forbidden(anyhow!("Authentication required")))?;

    if claims.token_type != expected {
        return Err(AppError::forbidden(anyhow!("Wrong token type")));
    }

    Ok(claims)
}
