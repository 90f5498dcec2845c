use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_movie, delete_movie, get_movie_by_id, get_movies, update_movie};

pub fn init_movie_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_movies).post(create_movie))
        .route(
            "/{id}",
            get(get_movie_by_id).patch(update_movie).delete(delete_movie),
        )
}
