use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        results::{FinaleWeekRequest, RegularWeekRequest, WeekDetail},
        scoring::RecomputeSummary,
    },
    models::Episode,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

fn check_week(week: i32) -> Result<(), WebError> {
    if week < 1 {
        return Err(WebError::BadRequest(format!(
            "week must be at least 1, got {week}"
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/leagues/{league_id}/weeks/{week}",
    params(
        ("league_id" = Uuid, Path, description = "League id"),
        ("week" = i32, Path, description = "Week number, starting at 1")
    ),
    responses(
        (status = 200, description = "Stored results and scores of the week", body = WeekDetail),
        (status = 400, description = "Invalid week"),
        (status = 404, description = "League or week not found")
    ),
    tag = "weeks"
)]
pub async fn get_week(
    State(db): State<Database>,
    Path((league_id, week)): Path<(Uuid, i32)>,
) -> Result<Response, WebError> {
    check_week(week)?;

    let detail = services::get_week(db.pool(), league_id, week).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    put,
    path = "/api/leagues/{league_id}/weeks/{week}",
    params(
        ("league_id" = Uuid, Path, description = "League id"),
        ("week" = i32, Path, description = "Week number, starting at 1")
    ),
    request_body = RegularWeekRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Results stored and week rescored", body = RecomputeSummary),
        (status = 400, description = "Invalid results"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "League not found"),
        (status = 422, description = "Stored picks contradict the season rules")
    ),
    tag = "weeks"
)]
pub async fn save_regular_week(
    State(db): State<Database>,
    Path((league_id, week)): Path<(Uuid, i32)>,
    Json(req): Json<RegularWeekRequest>,
) -> Result<Response, WebError> {
    check_week(week)?;
    req.validate()?;

    let summary = services::save_regular_week(db.pool(), league_id, week, &req).await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    post,
    path = "/api/leagues/{league_id}/weeks/{week}/finale",
    params(
        ("league_id" = Uuid, Path, description = "League id"),
        ("week" = i32, Path, description = "Week number, starting at 1")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Week marked as the finale", body = Episode),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "League not found")
    ),
    tag = "weeks"
)]
pub async fn mark_finale(
    State(db): State<Database>,
    Path((league_id, week)): Path<(Uuid, i32)>,
) -> Result<Response, WebError> {
    check_week(week)?;

    let episode = services::mark_finale(db.pool(), league_id, week).await?;

    Ok(Json(episode).into_response())
}

#[utoipa::path(
    put,
    path = "/api/leagues/{league_id}/weeks/{week}/finale",
    params(
        ("league_id" = Uuid, Path, description = "League id"),
        ("week" = i32, Path, description = "Week number, starting at 1")
    ),
    request_body = FinaleWeekRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Finale stored and rescored", body = RecomputeSummary),
        (status = 400, description = "Invalid placements or week is not the finale"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "League or finale episode not found"),
        (status = 422, description = "Stored picks contradict the season rules")
    ),
    tag = "weeks"
)]
pub async fn save_finale_week(
    State(db): State<Database>,
    Path((league_id, week)): Path<(Uuid, i32)>,
    Json(req): Json<FinaleWeekRequest>,
) -> Result<Response, WebError> {
    check_week(week)?;
    req.validate()?;

    let summary = services::save_finale_week(db.pool(), league_id, week, &req).await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    post,
    path = "/api/leagues/{league_id}/episodes/{episode_id}/recompute",
    params(
        ("league_id" = Uuid, Path, description = "League id"),
        ("episode_id" = Uuid, Path, description = "Episode id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Episode rescored", body = RecomputeSummary),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Episode not found in this league"),
        (status = 422, description = "Stored picks contradict the season rules")
    ),
    tag = "weeks"
)]
pub async fn recompute_episode(
    State(db): State<Database>,
    Path((league_id, episode_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let summary = services::recompute_episode(db.pool(), league_id, episode_id)
        .await?
        .ok_or(WebError::NotFound)?;

    Ok(Json(summary).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_week_zero_is_a_bad_request() {
        assert!(check_week(1).is_ok());

        let response = check_week(0).unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
