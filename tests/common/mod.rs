use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sqlx::PgPool;

use reelbase::config::cors::CorsConfig;
use reelbase::config::jwt::JwtConfig;
use reelbase::config::security::SecurityConfig;
use reelbase::modules::user::model::Role;
use reelbase::router::init_router;
use reelbase::state::AppState;
use reelbase::utils::jwt::issue_token;
use reelbase::utils::password::hash_password;

#[allow(dead_code)]
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_token_secret: "access-secret-for-tests-only".to_string(),
        refresh_token_secret: "refresh-secret-for-tests-only".to_string(),
        access_token_expiry: 300,
        refresh_token_expiry: 86400,
    }
}

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        // Minimum bcrypt cost keeps the tests fast.
        security_config: SecurityConfig { hash_rounds: 4 },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    };
    init_router(state)
}

#[allow(dead_code)]
pub fn basic_header(email: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", email, password)))
}

pub fn bearer_header(user_id: i64, role: Role, is_refresh: bool) -> String {
    let token = issue_token(user_id, role, is_refresh, &test_jwt_config()).unwrap();
    format!("Bearer {}", token)
}

#[allow(dead_code)]
pub async fn create_test_user(pool: &PgPool, email: &str, password: &str, role: Role) -> i64 {
    let hashed = hash_password(password, 4).unwrap();

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn seed_director(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO directors (name, dob, nationality) VALUES ($1, '1961-08-25', 'American') RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn seed_genre(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO genres (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}
