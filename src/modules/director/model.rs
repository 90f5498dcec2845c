use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Director {
    pub id: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub nationality: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDirectorDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub dob: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub nationality: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDirectorDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub nationality: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedDirectorResponse {
    pub id: i64,
}
