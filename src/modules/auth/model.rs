use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::user::model::Role;

/// Distinguishes the two token kinds carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims: subject id, role and the token type tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
}
