use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{login_user, me, register_user, rotate_access_token};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/token/access", post(rotate_access_token))
        .route("/me", get(me))
}
