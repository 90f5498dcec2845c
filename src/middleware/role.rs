//! Minimum-role authorization layer.
//!
//! Routes declare the least-privileged role allowed to reach them; the
//! ordinal encoding (admin = 0 < paidUser = 1 < user = 2) means a
//! principal passes when its ordinal is less than or equal to the
//! requirement. The check runs after [`super::auth::bearer_token_middleware`]
//! and reads the claims it attached; denial carries no detail about the
//! resource.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::modules::auth::model::{Claims, TokenType};
use crate::modules::user::model::Role;
use crate::utils::errors::AppError;

/// The authorization decision, separated from the middleware plumbing.
///
/// Requires an authenticated principal holding an access token whose role
/// satisfies the minimum; fails closed on anything less.
pub fn check_minimum_role(claims: Option<&Claims>, minimum: Role) -> Result<(), AppError> {
    let claims = claims.ok_or_else(|| AppError::forbidden(anyhow!("Authentication required")))?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::forbidden(anyhow!("Access token required")));
    }

    if !claims.role.satisfies(minimum) {
        return Err(AppError::forbidden(anyhow!("Insufficient role")));
    }

    Ok(())
}

pub async fn require_role(req: Request, next: Next, minimum: Role) -> Result<Response, AppError> {
    check_minimum_role(req.extensions().get::<Claims>(), minimum)?;
    Ok(next.run(req).await)
}

/// Layer for admin-only route groups.
///
/// ```rust,ignore
/// Router::new()
///     .route("/", post(create_movie))
///     .route_layer(middleware::from_fn(require_admin));
/// ```
pub async fn require_admin(req: Request, next: Next) -> Response {
    match require_role(req, next, Role::Admin).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Extractor variant of the admin requirement, for routes whose siblings
/// on the same path are public.
///
/// ```rust,ignore
/// pub async fn create_movie(
///     _admin: RequireAdmin,
///     State(state): State<AppState>,
///     ...
/// ) -> Result<..., AppError> {
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check_minimum_role(parts.extensions.get::<Claims>(), Role::Admin)?;
        Ok(RequireAdmin)
    }
}
