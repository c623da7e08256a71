use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One player's draft in a league. `(league_id, user_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub entry_id: Uuid,
    pub league_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A drafted contestant in one slot. The multiplier is fixed when the pick is
/// made and is never recomputed from the rule set afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Pick {
    pub entry_id: Uuid,
    pub slot: i16,
    pub contestant_id: Uuid,
    pub contestant_name: String,
    pub multiplier: Decimal,
}
