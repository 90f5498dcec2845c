use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::auth::bearer_token_middleware;
use crate::middleware::role::require_admin;
use crate::modules::auth::router::init_auth_router;
use crate::modules::director::router::init_director_router;
use crate::modules::genre::router::init_genre_router;
use crate::modules::movie::router::init_movie_router;
use crate::modules::user::router::init_user_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/auth", init_auth_router())
        .nest("/movie", init_movie_router())
        .nest("/director", init_director_router())
        .nest("/genre", init_genre_router())
        .nest(
            "/user",
            init_user_router().route_layer(middleware::from_fn(require_admin)),
        )
        .with_state(state.clone())
        // Runs before routing-level gates so the claims they inspect are
        // already attached.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_token_middleware,
        ))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
