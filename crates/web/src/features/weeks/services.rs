use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        results::{FinaleWeekRequest, RegularWeekRequest, WeekDetail},
        scoring::RecomputeSummary,
    },
    error::Result,
    models::Episode,
    services::{results, scoring},
};
use uuid::Uuid;

pub async fn get_week(pool: &PgPool, league_id: Uuid, week: i32) -> Result<WeekDetail> {
    results::week_detail(pool, league_id, week).await
}

pub async fn save_regular_week(
    pool: &PgPool,
    league_id: Uuid,
    week: i32,
    req: &RegularWeekRequest,
) -> Result<RecomputeSummary> {
    results::save_regular_week(pool, league_id, week, req, Utc::now()).await
}

pub async fn mark_finale(pool: &PgPool, league_id: Uuid, week: i32) -> Result<Episode> {
    results::mark_finale(pool, league_id, week).await
}

pub async fn save_finale_week(
    pool: &PgPool,
    league_id: Uuid,
    week: i32,
    req: &FinaleWeekRequest,
) -> Result<RecomputeSummary> {
    results::save_finale_week(pool, league_id, week, req).await
}

/// Rescore one episode from its stored results
pub async fn recompute_episode(
    pool: &PgPool,
    league_id: Uuid,
    episode_id: Uuid,
) -> Result<Option<RecomputeSummary>> {
    scoring::recompute_week(pool, league_id, episode_id).await
}
