use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Ordinal user role. Lower value means more privilege, so a role
/// satisfies any requirement with an equal or greater ordinal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[repr(i16)]
pub enum Role {
    Admin = 0,
    PaidUser = 1,
    User = 2,
}

impl Role {
    pub fn satisfies(self, minimum: Role) -> bool {
        (self as i16) <= (minimum as i16)
    }
}

/// A user as exposed by the API. The password hash is never selected into
/// this struct; queries list columns explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}
