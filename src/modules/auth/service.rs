use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::config::security::SecurityConfig;
use crate::modules::user::model::{Role, User};
use crate::utils::credentials::parse_basic_credentials;
use crate::utils::errors::AppError;
use crate::utils::jwt::issue_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{AccessTokenResponse, Claims, TokenPairResponse};

// One message for both unknown email and wrong password, so responses
// cannot be used to probe which addresses have accounts.
fn invalid_credentials() -> AppError {
    AppError::bad_request(anyhow!("Invalid login credentials"))
}

pub struct AuthService;

impl AuthService {
    /// Registers a new user from a `Basic` credential header. The stored
    /// password is a bcrypt hash with the configured cost; the returned
    /// user carries no password field at all.
    #[instrument(skip(db, raw_token, security_config))]
    pub async fn register(
        db: &PgPool,
        raw_token: &str,
        security_config: &SecurityConfig,
    ) -> Result<User, AppError> {
        let (email, password) = parse_basic_credentials(raw_token)?;

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&email)
                .fetch_one(db)
                .await?;

        if exists {
            return Err(AppError::bad_request(anyhow!("Email is already registered")));
        }

        let hashed = hash_password(&password, security_config.hash_rounds)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password)
             VALUES ($1, $2)
             RETURNING id, email, role, created_at, updated_at, version",
        )
        .bind(&email)
        .bind(&hashed)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(db, password))]
    pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: i64,
            email: String,
            password: String,
            role: Role,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
            version: i32,
        }

        let user = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, email, password, role, created_at, updated_at, version
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &user.password)? {
            return Err(invalid_credentials());
        }

        Ok(User {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
            version: user.version,
        })
    }

    /// Decodes the `Basic` header, authenticates, and issues both tokens.
    #[instrument(skip(db, raw_token, jwt_config))]
    pub async fn login(
        db: &PgPool,
        raw_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let (email, password) = parse_basic_credentials(raw_token)?;

        let user = Self::authenticate(db, &email, &password).await?;

        Ok(TokenPairResponse {
            access_token: issue_token(user.id, user.role, false, jwt_config)?,
            refresh_token: issue_token(user.id, user.role, true, jwt_config)?,
        })
    }

    /// Issues a fresh access token from refresh claims already verified by
    /// the route's gate.
    pub fn rotate_access_token(
        claims: &Claims,
        jwt_config: &JwtConfig,
    ) -> Result<AccessTokenResponse, AppError> {
        Ok(AccessTokenResponse {
            access_token: issue_token(claims.sub, claims.role, false, jwt_config)?,
        })
    }

    #[instrument(skip(db))]
    pub async fn me(db: &PgPool, user_id: i64) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, role, created_at, updated_at, version FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        user.ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::TokenType;
    use crate::utils::jwt::verify_token;
    use axum::http::StatusCode;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    fn basic_header(email: &str, password: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", email, password)))
    }

    fn test_security_config() -> SecurityConfig {
        // Minimum bcrypt cost keeps the tests fast.
        SecurityConfig { hash_rounds: 4 }
    }

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_token_secret: "access-secret-for-tests-only".to_string(),
            refresh_token_secret: "refresh-secret-for-tests-only".to_string(),
            access_token_expiry: 300,
            refresh_token_expiry: 86400,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_register_creates_user_with_default_role(pool: PgPool) {
        let header = basic_header("new@example.com", "pw123456");

        let user = AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.role, Role::User);

        // The stored hash is never the plaintext.
        let stored: String =
            sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stored, "pw123456");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_register_duplicate_email_writes_nothing(pool: PgPool) {
        let header = basic_header("dup@example.com", "pw123456");

        AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        let err = AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_register_rejects_malformed_header(pool: PgPool) {
        let err = AuthService::register(&pool, "Basic not-base64!!", &test_security_config())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_authenticate_roundtrip(pool: PgPool) {
        let header = basic_header("auth@example.com", "correct-pw");
        let registered = AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        let user = AuthService::authenticate(&pool, "auth@example.com", "correct-pw")
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_authenticate_failures_are_indistinguishable(pool: PgPool) {
        let header = basic_header("known@example.com", "correct-pw");
        AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        let unknown = AuthService::authenticate(&pool, "unknown@example.com", "whatever")
            .await
            .unwrap_err();
        let wrong_pw = AuthService::authenticate(&pool, "known@example.com", "wrong-pw")
            .await
            .unwrap_err();

        assert_eq!(unknown.status, wrong_pw.status);
        assert_eq!(unknown.error.to_string(), wrong_pw.error.to_string());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_issues_both_token_kinds(pool: PgPool) {
        let jwt_config = test_jwt_config();
        let header = basic_header("login@example.com", "pw123456");
        let registered = AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        let tokens = AuthService::login(&pool, &header, &jwt_config).await.unwrap();

        let access = verify_token(&tokens.access_token, false, &jwt_config).unwrap();
        assert_eq!(access.sub, registered.id);
        assert_eq!(access.token_type, TokenType::Access);

        let refresh = verify_token(&tokens.refresh_token, true, &jwt_config).unwrap();
        assert_eq!(refresh.sub, registered.id);
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rotate_access_token(pool: PgPool) {
        let _ = pool;
        let jwt_config = test_jwt_config();

        let claims = Claims {
            sub: 42,
            role: Role::PaidUser,
            token_type: TokenType::Refresh,
            exp: 9999999999,
            iat: 1234567890,
        };

        let response = AuthService::rotate_access_token(&claims, &jwt_config).unwrap();

        let access = verify_token(&response.access_token, false, &jwt_config).unwrap();
        assert_eq!(access.sub, 42);
        assert_eq!(access.role, Role::PaidUser);
        assert_eq!(access.token_type, TokenType::Access);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_me(pool: PgPool) {
        let header = basic_header("me@example.com", "pw123456");
        let registered = AuthService::register(&pool, &header, &test_security_config())
            .await
            .unwrap();

        let user = AuthService::me(&pool, registered.id).await.unwrap();
        assert_eq!(user, registered);

        let missing = AuthService::me(&pool, 9999).await.unwrap_err();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }
}
