use std::env;

/// JWT signing configuration.
///
/// Access and refresh tokens are signed with distinct secrets so that one
/// kind can never verify as the other. Both secrets are required; the
/// process refuses to start without them.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET must be set"),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET must be set"),
            access_token_expiry: env::var("ACCESS_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300), // 5 minutes
            refresh_token_expiry: env::var("REFRESH_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86400), // 24 hours
        }
    }
}
