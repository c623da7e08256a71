use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    EntryPicks, EntryTotals, FinaleOutcome, RegularOutcome, eliminated_before_week,
    score_finale_week, score_regular_week,
};
use crate::dto::scoring::RecomputeSummary;
use crate::error::Result;
use crate::models::{EpisodeType, SeasonRules};
use crate::repository::{
    entry::EntryRepository, episode::EpisodeRepository, league::LeagueRepository,
    score::ScoreRepository, season::SeasonRepository,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeOutcome {
    Regular(RegularOutcome),
    Finale(FinaleOutcome),
}

impl EpisodeOutcome {
    pub fn episode_type(&self) -> EpisodeType {
        match self {
            Self::Regular(_) => EpisodeType::Regular,
            Self::Finale(_) => EpisodeType::Finale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringEpisode {
    pub episode_id: Uuid,
    pub week: i32,
    pub outcome: EpisodeOutcome,
}

/// Computes the points of every entry for one episode.
///
/// `eliminated` is the permanent elimination set as of the episode's week;
/// finale scoring does not consult it.
pub fn compute_week_scores(
    episode: &ScoringEpisode,
    eliminated: &HashSet<Uuid>,
    entries: &[EntryPicks],
    rules: &SeasonRules,
) -> Result<EntryTotals> {
    for entry in entries {
        entry.validate(rules)?;
    }

    match &episode.outcome {
        EpisodeOutcome::Regular(outcome) => score_regular_week(outcome, eliminated, entries),
        EpisodeOutcome::Finale(outcome) => score_finale_week(outcome, entries),
    }
}

/// Rewrites the scores of one episode in its own transaction.
///
/// Returns `None` without touching anything when the episode does not exist
/// in the league.
pub async fn recompute_week(
    pool: &PgPool,
    league_id: Uuid,
    episode_id: Uuid,
) -> Result<Option<RecomputeSummary>> {
    let mut tx = pool.begin().await?;

    let summary = recompute_week_in(&mut tx, league_id, episode_id).await?;

    tx.commit().await?;
    Ok(summary)
}

/// Rewrites the scores of one episode inside the caller's transaction.
///
/// The episode row stays locked until the transaction ends, so two
/// recomputes of the same episode never interleave their deletes and
/// inserts. Any error leaves the transaction for the caller to drop.
pub async fn recompute_week_in(
    tx: &mut Transaction<'_, Postgres>,
    league_id: Uuid,
    episode_id: Uuid,
) -> Result<Option<RecomputeSummary>> {
    let Some(episode) = EpisodeRepository::new(&mut **tx)
        .find_for_update(episode_id)
        .await?
    else {
        info!(%episode_id, "Episode not found, nothing to recompute");
        return Ok(None);
    };

    if episode.league_id != league_id {
        warn!(%episode_id, %league_id, "Episode belongs to another league, nothing to recompute");
        return Ok(None);
    }

    let league = LeagueRepository::new(&mut **tx).find_by_id(league_id).await?;

    let mut seasons = SeasonRepository::new(&mut **tx);
    let rules = seasons.rules(&league.season_key).await?;
    let roster: HashSet<Uuid> = seasons
        .roster(&league.season_key)
        .await?
        .into_iter()
        .map(|contestant| contestant.contestant_id)
        .collect();

    let mut episodes = EpisodeRepository::new(&mut **tx);
    let outcome = match episode.episode_type()? {
        EpisodeType::Regular => {
            let results = episodes.results(episode_id).await?;
            EpisodeOutcome::Regular(RegularOutcome::from_results(&results, &roster)?)
        }
        EpisodeType::Finale => {
            let placements = episodes.finale_placements(episode_id).await?;
            let extras = episodes.finale_extras(episode_id).await?;
            EpisodeOutcome::Finale(FinaleOutcome::from_rows(&placements, &extras, &roster)?)
        }
    };
    let episode_type = outcome.episode_type();

    let replaced_rows = ScoreRepository::new(&mut **tx)
        .delete_for_episode(episode_id)
        .await?;

    let mut entries_repo = EntryRepository::new(&mut **tx);
    let entries = entries_repo.list_by_league(league_id).await?;
    let picks = entries_repo.picks_by_league(league_id).await?;
    let entries = EntryPicks::group(&entries, &picks);

    let eliminated = match &outcome {
        EpisodeOutcome::Regular(regular) => {
            eliminated_before_week(&mut **tx, league_id, episode.week, regular.eliminated).await?
        }
        EpisodeOutcome::Finale(_) => HashSet::new(),
    };

    let scoring = ScoringEpisode {
        episode_id,
        week: episode.week,
        outcome,
    };
    let totals = compute_week_scores(&scoring, &eliminated, &entries, &rules)?;

    let rows: Vec<_> = totals.into_iter().collect();
    let written = ScoreRepository::new(&mut **tx)
        .insert_for_episode(episode_id, &rows)
        .await?;

    info!(
        %league_id,
        %episode_id,
        week = episode.week,
        episode_type = %episode_type,
        replaced_rows,
        scores_written = written.len(),
        "Recomputed episode scores"
    );

    Ok(Some(RecomputeSummary {
        league_id,
        episode_id,
        week: episode.week,
        episode_type,
        replaced_rows,
        scores_written: written.len(),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::super::permanently_eliminated;
    use super::super::test_support::{contestants, entry, reference_rules};
    use super::super::FinaleBonus;
    use super::*;
    use crate::error::StorageError;

    fn regular(week: i32, outcome: RegularOutcome) -> ScoringEpisode {
        ScoringEpisode {
            episode_id: Uuid::new_v4(),
            week,
            outcome: EpisodeOutcome::Regular(outcome),
        }
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let [x, y, z, w] = contestants();
        let episode = regular(
            3,
            RegularOutcome {
                mini_winners: BTreeSet::from([x]),
                main_winners: BTreeSet::from([y]),
                lipsync_winner: Some(z),
                eliminated: Some(w),
            },
        );
        let entries = vec![
            entry([x, y, z, w]),
            entry([w, z, y, x]),
            EntryPicks::new(Uuid::new_v4(), vec![]),
        ];
        let eliminated = permanently_eliminated(Vec::new(), Some(w));
        let rules = reference_rules();

        let first = compute_week_scores(&episode, &eliminated, &entries, &rules).unwrap();
        let second = compute_week_scores(&episode, &eliminated, &entries, &rules).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[&entries[0].entry_id], Decimal::new(1085, 1));
    }

    #[test]
    fn test_finale_ignores_elimination_set() {
        let [first, second, third, fourth] = contestants();
        let roster = HashSet::from([first, second, third, fourth]);
        let outcome = FinaleOutcome::new(
            &[(first, 1), (second, 2), (third, 3), (fourth, 4)],
            vec![(
                first,
                FinaleBonus {
                    lipsync_wins: 2,
                    ..Default::default()
                },
            )],
            &roster,
        )
        .unwrap();
        let episode = ScoringEpisode {
            episode_id: Uuid::new_v4(),
            week: 14,
            outcome: EpisodeOutcome::Finale(outcome),
        };
        let entries = vec![entry([first, second, third, fourth])];
        let eliminated = HashSet::from([first]);

        let totals = compute_week_scores(&episode, &eliminated, &entries, &reference_rules()).unwrap();

        // 110*2.5 + 40*2.0 + 15*1.5 + 15*1.0
        assert_eq!(totals[&entries[0].entry_id], Decimal::new(3925, 1));
    }

    #[test]
    fn test_invalid_entry_aborts_whole_week() {
        let [a, b, c, d] = contestants();
        let good = entry([a, b, c, d]);
        let mut bad = entry([d, c, b, a]);
        bad.picks[0].multiplier = Some(Decimal::new(99, 1));

        let err = compute_week_scores(
            &regular(1, RegularOutcome::default()),
            &HashSet::new(),
            &[good, bad],
            &reference_rules(),
        )
        .unwrap_err();

        assert!(matches!(err, StorageError::DataIntegrity(_)));
    }

    #[test]
    fn test_outcome_reports_episode_type() {
        let episode = regular(1, RegularOutcome::default());
        assert_eq!(episode.outcome.episode_type(), EpisodeType::Regular);
    }
}
