use std::env;

/// Password hashing configuration.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// bcrypt cost factor used when hashing new passwords.
    pub hash_rounds: u32,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        Self {
            hash_rounds: env::var("HASH_ROUNDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
        }
    }
}
