//! Cursor pagination over a stable, ascending id sort.
//!
//! Listings fetch `limit + 1` rows past the cursor; the extra row only
//! signals `has_more` and is never returned. `next_cursor` is the id of
//! the last returned row, so a page is always resumable even while rows
//! are inserted or deleted concurrently.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// Query-string values arrive as strings once the struct is flattened into
// the route's params, so numeric fields need a tolerant deserializer.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CursorPaginationParams {
    /// Id of the last row seen; rows with greater ids are returned.
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub cursor: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl Default for CursorPaginationParams {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: Some(10),
        }
    }
}

impl CursorPaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn after(&self) -> i64 {
        self.cursor.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CursorMeta {
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
    pub has_more: bool,
}

impl CursorMeta {
    /// Builds the page meta from an over-fetched row set, truncating the
    /// probe row in place. `last_id` reads the sort key off a kept row.
    pub fn paginate<T>(rows: &mut Vec<T>, limit: i64, last_id: impl Fn(&T) -> i64) -> Self {
        let has_more = rows.len() as i64 > limit;
        if has_more {
            rows.truncate(limit as usize);
        }

        Self {
            count: rows.len() as i64,
            next_cursor: if has_more { rows.last().map(&last_id) } else { None },
            has_more,
        }
    }
}
