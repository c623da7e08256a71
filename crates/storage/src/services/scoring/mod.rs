//! Weekly point accrual for league entries.
//!
//! Regular weeks award survival and challenge wins to every contestant that
//! is still in the competition; finale weeks award stacked placement points
//! plus counted bonus wins. Both paths multiply each pick by the multiplier
//! stored on the pick and sum in [`Decimal`].

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Entry, Pick, SeasonRules};

pub mod elimination;
pub mod finale;
pub mod recompute;
pub mod regular;

pub use elimination::{eliminated_before_week, permanently_eliminated};
pub use finale::{FinaleBonus, FinaleOutcome, score_finale_week};
pub use recompute::{EpisodeOutcome, ScoringEpisode, compute_week_scores, recompute_week, recompute_week_in};
pub use regular::{RegularOutcome, score_regular_week};

/// Point values of the reference rule set.
pub mod points {
    pub const SURVIVED: i64 = 1;
    pub const MINI_WIN: i64 = 15;
    pub const MAIN_WIN: i64 = 25;
    pub const LIPSYNC_WIN: i64 = 10;

    pub const TOP_FOUR: i64 = 15;
    pub const TOP_TWO: i64 = 25;
    pub const WINNER: i64 = 50;
}

/// Points per entry for one episode, keyed by entry id.
pub type EntryTotals = BTreeMap<Uuid, Decimal>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPick {
    pub slot: i16,
    pub contestant_id: Uuid,
    pub multiplier: Option<Decimal>,
}

impl ScoringPick {
    pub fn multiplier(&self) -> Result<Decimal> {
        self.multiplier.ok_or_else(|| {
            StorageError::invalid_input(format!("pick in slot {} has no multiplier", self.slot))
        })
    }
}

impl From<&Pick> for ScoringPick {
    fn from(pick: &Pick) -> Self {
        Self {
            slot: pick.slot,
            contestant_id: pick.contestant_id,
            multiplier: Some(pick.multiplier),
        }
    }
}

/// An entry together with its picks, as the scorers consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPicks {
    pub entry_id: Uuid,
    pub picks: Vec<ScoringPick>,
}

impl EntryPicks {
    pub fn new(entry_id: Uuid, picks: Vec<ScoringPick>) -> Self {
        Self { entry_id, picks }
    }

    /// Groups picks under their entries. Every entry is returned, including
    /// entries without picks; picks of unknown entries are dropped.
    pub fn group(entries: &[Entry], picks: &[Pick]) -> Vec<Self> {
        let mut by_entry: BTreeMap<Uuid, Vec<ScoringPick>> = entries
            .iter()
            .map(|entry| (entry.entry_id, Vec::new()))
            .collect();

        for pick in picks {
            if let Some(slot_picks) = by_entry.get_mut(&pick.entry_id) {
                slot_picks.push(ScoringPick::from(pick));
            }
        }

        by_entry
            .into_iter()
            .map(|(entry_id, mut picks)| {
                picks.sort_by_key(|p| p.slot);
                Self::new(entry_id, picks)
            })
            .collect()
    }

    /// Checks the picks against the season rules.
    ///
    /// An entry holds either no picks or one pick per slot, with distinct
    /// contestants, each carrying a multiplier the rule set hands out.
    pub fn validate(&self, rules: &SeasonRules) -> Result<()> {
        if self.picks.is_empty() {
            return Ok(());
        }

        if self.picks.len() != rules.slot_count() {
            return Err(StorageError::data_integrity(format!(
                "entry {} has {} picks, expected {}",
                self.entry_id,
                self.picks.len(),
                rules.slot_count()
            )));
        }

        let mut slots = HashSet::new();
        let mut contestants = HashSet::new();

        for pick in &self.picks {
            if !rules.has_slot(pick.slot) {
                return Err(StorageError::data_integrity(format!(
                    "entry {} uses slot {} outside the {} rule set",
                    self.entry_id,
                    pick.slot,
                    rules.season_key()
                )));
            }
            if !slots.insert(pick.slot) {
                return Err(StorageError::data_integrity(format!(
                    "entry {} fills slot {} twice",
                    self.entry_id, pick.slot
                )));
            }
            if !contestants.insert(pick.contestant_id) {
                return Err(StorageError::data_integrity(format!(
                    "entry {} picks contestant {} in more than one slot",
                    self.entry_id, pick.contestant_id
                )));
            }

            let multiplier = pick.multiplier()?;
            if !rules.is_known_multiplier(multiplier) {
                return Err(StorageError::data_integrity(format!(
                    "entry {} slot {} has multiplier {} which is not a {} slot value",
                    self.entry_id,
                    pick.slot,
                    multiplier,
                    rules.season_key()
                )));
            }
        }

        Ok(())
    }
}

/// Sums `base(contestant) * multiplier` over an entry's picks.
pub(crate) fn weighted_total<F>(entry: &EntryPicks, mut base_points: F) -> Result<Decimal>
where
    F: FnMut(&ScoringPick) -> i64,
{
    entry.picks.iter().try_fold(Decimal::ZERO, |total, pick| {
        let multiplier = pick.multiplier()?;
        Ok(total + Decimal::from(base_points(pick)) * multiplier)
    })
}
