use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One row of a league leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardRow {
    pub entry_id: Uuid,
    pub user_id: String,
    pub total_points: Decimal,
    /// Competition rank: equal totals share a rank, the next total skips ahead.
    pub rank: i64,
    /// Rank after the previous scored week, `null` until two weeks are scored.
    pub last_week_rank: Option<i64>,
    /// `last_week_rank - rank`; positive means the entry moved up.
    pub delta_rank: Option<i64>,
    pub picks: Vec<LeaderboardPick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardPick {
    pub slot: i16,
    pub contestant_id: Uuid,
    pub contestant_name: String,
    pub multiplier: Decimal,
    /// Eliminated in any week so far; the pick earns nothing from now on.
    pub eliminated: bool,
}
