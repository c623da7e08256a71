use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::scoring::{FinaleOutcome, recompute_week_in};
use crate::dto::results::{FinaleWeekRequest, RegularWeekRequest, WeekDetail};
use crate::dto::scoring::RecomputeSummary;
use crate::error::{Result, StorageError};
use crate::models::{Episode, EpisodeType, League, LeagueStatus};
use crate::repository::{
    episode::EpisodeRepository, league::LeagueRepository, score::ScoreRepository,
    season::SeasonRepository,
};

fn ensure_on_roster<'a, I>(contestants: I, roster: &HashSet<Uuid>) -> Result<()>
where
    I: IntoIterator<Item = &'a Uuid>,
{
    match contestants.into_iter().find(|id| !roster.contains(id)) {
        Some(id) => Err(StorageError::invalid_input(format!(
            "contestant {id} is not on the season roster"
        ))),
        None => Ok(()),
    }
}

async fn season_roster(conn: &mut PgConnection, league: &League) -> Result<HashSet<Uuid>> {
    let roster = SeasonRepository::new(conn)
        .roster(&league.season_key)
        .await?
        .into_iter()
        .map(|contestant| contestant.contestant_id)
        .collect();
    Ok(roster)
}

/// Stored results and scores of one week.
pub async fn week_detail(pool: &PgPool, league_id: Uuid, week: i32) -> Result<WeekDetail> {
    let mut conn = pool.acquire().await?;

    LeagueRepository::new(&mut *conn).find_by_id(league_id).await?;

    let mut episodes = EpisodeRepository::new(&mut *conn);
    let episode = episodes
        .find_by_week(league_id, week)
        .await?
        .ok_or(StorageError::NotFound)?;

    let (results, placements, extras) = match episode.episode_type()? {
        EpisodeType::Regular => (episodes.results(episode.episode_id).await?, vec![], vec![]),
        EpisodeType::Finale => (
            vec![],
            episodes.finale_placements(episode.episode_id).await?,
            episodes.finale_extras(episode.episode_id).await?,
        ),
    };

    let scores = ScoreRepository::new(&mut *conn)
        .list_for_episode(episode.episode_id)
        .await?;

    Ok(WeekDetail {
        episode,
        results,
        placements,
        extras,
        scores,
    })
}

/// Stores the results of a regular week and rescores it.
///
/// Results and scores land in one transaction; a failed recompute leaves
/// the previous results in place.
pub async fn save_regular_week(
    pool: &PgPool,
    league_id: Uuid,
    week: i32,
    request: &RegularWeekRequest,
    now: DateTime<Utc>,
) -> Result<RecomputeSummary> {
    let mut tx = pool.begin().await?;

    let league = LeagueRepository::new(&mut *tx).find_by_id(league_id).await?;
    if !league.has_started(now) {
        return Err(StorageError::invalid_input(format!(
            "league {league_id} has not started yet"
        )));
    }

    let roster = season_roster(&mut *tx, &league).await?;
    ensure_on_roster(&request.contestant_ids(), &roster)?;

    let mut episodes = EpisodeRepository::new(&mut *tx);
    let episode = episodes
        .get_or_create(league_id, week, EpisodeType::Regular)
        .await?;
    if episode.episode_type()? != EpisodeType::Regular {
        return Err(StorageError::invalid_input(format!(
            "week {week} is a finale, submit placements instead"
        )));
    }
    episodes
        .replace_results(episode.episode_id, &request.result_rows())
        .await?;

    let summary = recompute_week_in(&mut tx, league_id, episode.episode_id)
        .await?
        .ok_or(StorageError::NotFound)?;

    tx.commit().await?;

    info!(%league_id, week, episode_id = %episode.episode_id, "Saved regular week results");
    Ok(summary)
}

/// Turns the episode of `week` into the league finale.
///
/// Scores computed under the regular rules are dropped when a regular week
/// is retyped; they come back once placements are submitted. Marking an
/// existing finale again changes nothing.
pub async fn mark_finale(pool: &PgPool, league_id: Uuid, week: i32) -> Result<Episode> {
    let mut tx = pool.begin().await?;

    LeagueRepository::new(&mut *tx).find_by_id(league_id).await?;

    let mut episodes = EpisodeRepository::new(&mut *tx);
    let previous_type = match episodes.find_by_week_for_update(league_id, week).await? {
        Some(existing) => Some(existing.episode_type()?),
        None => None,
    };
    let episode = episodes
        .upsert_type(league_id, week, EpisodeType::Finale)
        .await?;

    let dropped = if previous_type == Some(EpisodeType::Regular) {
        ScoreRepository::new(&mut *tx)
            .delete_for_episode(episode.episode_id)
            .await?
    } else {
        0
    };

    tx.commit().await?;

    info!(%league_id, week, episode_id = %episode.episode_id, dropped, "Marked week as finale");
    Ok(episode)
}

/// Stores finale placements and bonus wins, rescores the finale and
/// optionally closes the league.
///
/// The episode row is locked before its placements are replaced, so
/// concurrent saves of the same finale run one after the other.
pub async fn save_finale_week(
    pool: &PgPool,
    league_id: Uuid,
    week: i32,
    request: &FinaleWeekRequest,
) -> Result<RecomputeSummary> {
    let mut tx = pool.begin().await?;

    let league = LeagueRepository::new(&mut *tx).find_by_id(league_id).await?;
    let roster = season_roster(&mut *tx, &league).await?;

    let placements = request.placement_rows();
    let bonuses = request
        .extras
        .iter()
        .map(|extra| Ok((extra.contestant_id, extra.bonus()?)))
        .collect::<Result<Vec<_>>>()?;
    FinaleOutcome::new(&placements, bonuses, &roster)?;

    let mut episodes = EpisodeRepository::new(&mut *tx);
    let episode = episodes
        .find_by_week_for_update(league_id, week)
        .await?
        .ok_or(StorageError::NotFound)?;
    if episode.episode_type()? != EpisodeType::Finale {
        return Err(StorageError::invalid_input(format!(
            "week {week} is not marked as the finale"
        )));
    }

    let extras: Vec<_> = request.extras.iter().map(|extra| extra.as_row()).collect();
    episodes
        .replace_finale(episode.episode_id, &placements, &extras)
        .await?;

    let summary = recompute_week_in(&mut tx, league_id, episode.episode_id)
        .await?
        .ok_or(StorageError::NotFound)?;

    if request.finalize {
        LeagueRepository::new(&mut *tx)
            .set_status(league_id, LeagueStatus::Complete)
            .await?;
        info!(%league_id, "League marked complete");
    }

    tx.commit().await?;

    info!(%league_id, week, episode_id = %episode.episode_id, "Saved finale results");
    Ok(summary)
}
