//! Token issuance and verification.
//!
//! Access and refresh tokens carry the same claim shape but are signed
//! with distinct secrets and lifetimes. Verification always pins the
//! expected type: a refresh token can never authorize as an access token
//! or the other way around.

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::{Claims, TokenType};
use crate::modules::user::model::Role;
use crate::utils::errors::AppError;

pub fn issue_token(
    user_id: i64,
    role: Role,
    is_refresh: bool,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (secret, expiry) = if is_refresh {
        (
            &jwt_config.refresh_token_secret,
            jwt_config.refresh_token_expiry,
        )
    } else {
        (
            &jwt_config.access_token_secret,
            jwt_config.access_token_expiry,
        )
    };

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        token_type: if is_refresh {
            TokenType::Refresh
        } else {
            TokenType::Access
        },
        exp: (now + expiry) as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature, expiry and the `type` tag against the secret for
/// the expected token kind. Every failure mode is unauthorized.
pub fn verify_token(
    token: &str,
    expect_refresh: bool,
    jwt_config: &JwtConfig,
) -> Result<Claims, AppError> {
    let (secret, expected_type) = if expect_refresh {
        (&jwt_config.refresh_token_secret, TokenType::Refresh)
    } else {
        (&jwt_config.access_token_secret, TokenType::Access)
    };

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))?;

    if claims.token_type != expected_type {
        return Err(AppError::unauthorized(anyhow!("Wrong token type")));
    }

    Ok(claims)
}

/// Reads the `type` tag without verifying the signature, so the caller
/// can pick the matching secret before the real verification.
pub fn peek_token_type(token: &str) -> Result<TokenType, AppError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims.token_type)
        .map_err(|_| AppError::unauthorized(anyhow!("Invalid token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_token_secret: "access-secret-for-tests-only".to_string(),
            refresh_token_secret: "refresh-secret-for-tests-only".to_string(),
            access_token_expiry: 300,
            refresh_token_expiry: 86400,
        }
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let config = test_jwt_config();
        let token = issue_token(7, Role::PaidUser, false, &config).unwrap();

        let claims = verify_token(&token, false, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::PaidUser);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_access_token_fails_refresh_verification() {
        let config = test_jwt_config();
        let token = issue_token(1, Role::User, false, &config).unwrap();
        assert!(verify_token(&token, true, &config).is_err());
    }

    #[test]
    fn test_refresh_token_fails_access_verification() {
        let config = test_jwt_config();
        let token = issue_token(1, Role::User, true, &config).unwrap();
        assert!(verify_token(&token, false, &config).is_err());
    }

    #[test]
    fn test_peek_token_type() {
        let config = test_jwt_config();

        let access = issue_token(1, Role::User, false, &config).unwrap();
        assert_eq!(peek_token_type(&access).unwrap(), TokenType::Access);

        let refresh = issue_token(1, Role::User, true, &config).unwrap();
        assert_eq!(peek_token_type(&refresh).unwrap(), TokenType::Refresh);

        assert!(peek_token_type("not.a.token").is_err());
    }
}
