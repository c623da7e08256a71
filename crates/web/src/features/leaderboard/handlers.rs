use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{Database, dto::leaderboard::LeaderboardRow};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leagues/{league_id}/leaderboard",
    params(
        ("league_id" = Uuid, Path, description = "League id")
    ),
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = Vec<LeaderboardRow>),
        (status = 404, description = "League not found")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    Path(league_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let rows = services::get_leaderboard(db.pool(), league_id).await?;

    Ok(Json(rows).into_response())
}
