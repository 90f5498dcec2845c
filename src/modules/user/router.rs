use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_user_by_id, get_users};

pub fn init_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/{id}", get(get_user_by_id))
}
