use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{AccessTokenResponse, TokenPairResponse};
use crate::modules::director::model::{
    CreateDirectorDto, DeletedDirectorResponse, Director, UpdateDirectorDto,
};
use crate::modules::genre::model::{CreateGenreDto, DeletedGenreResponse, Genre, UpdateGenreDto};
use crate::modules::movie::model::{
    CreateMovieDto, DeletedMovieResponse, MovieDetail, MovieFilterParams, MovieWithRelations,
    PaginatedMoviesResponse, UpdateMovieDto,
};
use crate::modules::user::model::{Role, User};
use crate::utils::pagination::{CursorMeta, CursorPaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::rotate_access_token,
        crate::modules::auth::controller::me,
        crate::modules::movie::controller::create_movie,
        crate::modules::movie::controller::get_movies,
        crate::modules::movie::controller::get_movie_by_id,
        crate::modules::movie::controller::update_movie,
        crate::modules::movie::controller::delete_movie,
        crate::modules::director::controller::create_director,
        crate::modules::director::controller::get_directors,
        crate::modules::director::controller::get_director_by_id,
        crate::modules::director::controller::update_director,
        crate::modules::director::controller::delete_director,
        crate::modules::genre::controller::create_genre,
        crate::modules::genre::controller::get_genres,
        crate::modules::genre::controller::get_genre_by_id,
        crate::modules::genre::controller::update_genre,
        crate::modules::genre::controller::delete_genre,
        crate::modules::user::controller::get_users,
        crate::modules::user::controller::get_user_by_id,
    ),
    components(
        schemas(
            User,
            Role,
            TokenPairResponse,
            AccessTokenResponse,
            ErrorResponse,
            MovieWithRelations,
            MovieDetail,
            CreateMovieDto,
            UpdateMovieDto,
            MovieFilterParams,
            PaginatedMoviesResponse,
            DeletedMovieResponse,
            Director,
            CreateDirectorDto,
            UpdateDirectorDto,
            DeletedDirectorResponse,
            Genre,
            CreateGenreDto,
            UpdateGenreDto,
            DeletedGenreResponse,
            CursorMeta,
            CursorPaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token rotation"),
        (name = "Movies", description = "Movie catalog endpoints"),
        (name = "Directors", description = "Director management endpoints"),
        (name = "Genres", description = "Genre management endpoints"),
        (name = "Users", description = "User administration endpoints")
    ),
    info(
        title = "Reelbase API",
        version = "0.1.0",
        description = "A movie catalog REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication and role-based access control.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
