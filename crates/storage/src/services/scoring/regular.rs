use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use super::{EntryPicks, EntryTotals, points, weighted_total};
use crate::error::{Result, StorageError};
use crate::models::{EpisodeResult, ResultType};

/// What happened in one regular episode.
///
/// Several contestants may share a mini or main challenge win; the lip sync
/// has a single winner and at most one contestant goes home.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegularOutcome {
    pub mini_winners: BTreeSet<Uuid>,
    pub main_winners: BTreeSet<Uuid>,
    pub lipsync_winner: Option<Uuid>,
    pub eliminated: Option<Uuid>,
}

impl RegularOutcome {
    /// Builds the outcome from stored result rows. Every referenced
    /// contestant must be on `roster`.
    pub fn from_results(results: &[EpisodeResult], roster: &HashSet<Uuid>) -> Result<Self> {
        let mut outcome = Self::default();

        for result in results {
            let result_type = result.result_type()?;
            let Some(contestant_id) = result.contestant_id else {
                continue;
            };

            if !roster.contains(&contestant_id) {
                return Err(StorageError::invalid_input(format!(
                    "{result_type} result references contestant {contestant_id} outside the season"
                )));
            }

            match result_type {
                ResultType::Mini => {
                    outcome.mini_winners.insert(contestant_id);
                }
                ResultType::Main => {
                    outcome.main_winners.insert(contestant_id);
                }
                ResultType::Lipsync => {
                    outcome.lipsync_winner =
                        Some(single(outcome.lipsync_winner, contestant_id, result_type)?);
                }
                ResultType::Elimination => {
                    outcome.eliminated =
                        Some(single(outcome.eliminated, contestant_id, result_type)?);
                }
            }
        }

        Ok(outcome)
    }

    /// Points a contestant still in the competition earns this week.
    pub fn base_points(&self, contestant_id: Uuid) -> i64 {
        let mut base = points::SURVIVED;
        if self.mini_winners.contains(&contestant_id) {
            base += points::MINI_WIN;
        }
        if self.main_winners.contains(&contestant_id) {
            base += points::MAIN_WIN;
        }
        if self.lipsync_winner == Some(contestant_id) {
            base += points::LIPSYNC_WIN;
        }
        base
    }
}

fn single(current: Option<Uuid>, next: Uuid, result_type: ResultType) -> Result<Uuid> {
    match current {
        Some(existing) if existing != next => Err(StorageError::invalid_input(format!(
            "episode has more than one {result_type} result ({existing}, {next})"
        ))),
        _ => Ok(next),
    }
}

/// Scores a regular week for every entry.
///
/// Picks of contestants in `eliminated` earn nothing, whatever this week's
/// winner sets say.
pub fn score_regular_week(
    outcome: &RegularOutcome,
    eliminated: &HashSet<Uuid>,
    entries: &[EntryPicks],
) -> Result<EntryTotals> {
    entries
        .iter()
        .map(|entry| {
            let total = weighted_total(entry, |pick| {
                if eliminated.contains(&pick.contestant_id) {
                    0
                } else {
                    outcome.base_points(pick.contestant_id)
                }
            })?;
            Ok((entry.entry_id, total))
        })
        .collect()
}
