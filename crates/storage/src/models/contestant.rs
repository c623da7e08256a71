use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A draftable contestant of one season. Names are unique within a season.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contestant {
    pub contestant_id: Uuid,
    pub season_key: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
