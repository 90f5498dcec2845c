use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_genre, delete_genre, get_genre_by_id, get_genres, update_genre};

pub fn init_genre_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_genres).post(create_genre))
        .route(
            "/{id}",
            get(get_genre_by_id).patch(update_genre).delete(delete_genre),
        )
}
