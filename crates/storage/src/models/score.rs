use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Computed points of one entry for one episode.
///
/// Rows are derived data: the recompute deletes and rewrites every row of an
/// episode, nothing else writes to this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub entry_id: Uuid,
    pub episode_id: Uuid,
    pub points: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// A score row joined with the week it was earned in.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WeeklyScore {
    pub entry_id: Uuid,
    pub week: i32,
    pub points: Decimal,
}
