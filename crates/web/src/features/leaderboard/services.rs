use sqlx::PgPool;
use storage::{
    dto::leaderboard::LeaderboardRow, error::Result, services::leaderboard::league_leaderboard,
};
use uuid::Uuid;

/// Ranked standings of a league with movement since the previous week
pub async fn get_leaderboard(pool: &PgPool, league_id: Uuid) -> Result<Vec<LeaderboardRow>> {
    league_leaderboard(pool, league_id).await
}
