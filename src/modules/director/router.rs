use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_director, delete_director, get_director_by_id, get_directors, update_director,
};

pub fn init_director_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_directors).post(create_director))
        .route(
            "/{id}",
            get(get_director_by_id)
                .patch(update_director)
                .delete(delete_director),
        )
}
