use std::collections::{BTreeMap, BTreeSet, HashSet};

use uuid::Uuid;

use super::{EntryPicks, EntryTotals, points, weighted_total};
use crate::error::{Result, StorageError};
use crate::models::{FinaleExtra, FinalePlacement};

/// Number of contestants ranked in the finale.
pub const FINALE_PLACES: i16 = 4;

/// Challenge wins credited during the finale. Unlike regular weeks, every
/// win counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinaleBonus {
    pub mini_wins: u32,
    pub main_wins: u32,
    pub lipsync_wins: u32,
}

impl FinaleBonus {
    pub fn points(&self) -> i64 {
        i64::from(self.mini_wins) * points::MINI_WIN
            + i64::from(self.main_wins) * points::MAIN_WIN
            + i64::from(self.lipsync_wins) * points::LIPSYNC_WIN
    }

    /// Builds a bonus from stored or submitted win counts, rejecting
    /// negative ones.
    pub fn from_counts(
        contestant_id: Uuid,
        mini_wins: i32,
        main_wins: i32,
        lipsync_wins: i32,
    ) -> Result<Self> {
        let count = |value: i32, what: &str| {
            u32::try_from(value).map_err(|_| {
                StorageError::invalid_input(format!(
                    "contestant {contestant_id} has a negative {what} count ({value})"
                ))
            })
        };

        Ok(Self {
            mini_wins: count(mini_wins, "mini win")?,
            main_wins: count(main_wins, "main win")?,
            lipsync_wins: count(lipsync_wins, "lip sync win")?,
        })
    }
}

impl TryFrom<&FinaleExtra> for FinaleBonus {
    type Error = StorageError;

    fn try_from(extra: &FinaleExtra) -> Result<Self> {
        Self::from_counts(
            extra.contestant_id,
            extra.mini_wins,
            extra.main_wins,
            extra.lipsync_wins,
        )
    }
}

/// Placement points, stacked by tier: the winner also collects the top two
/// and top four awards.
pub fn placement_points(place: i16) -> i64 {
    match place {
        1 => points::TOP_FOUR + points::TOP_TWO + points::WINNER,
        2 => points::TOP_FOUR + points::TOP_TWO,
        3 | 4 => points::TOP_FOUR,
        _ => 0,
    }
}

/// Final placements and bonus wins of a finale episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinaleOutcome {
    placements: BTreeMap<Uuid, i16>,
    extras: BTreeMap<Uuid, FinaleBonus>,
}

impl FinaleOutcome {
    /// Validates and builds a finale outcome.
    ///
    /// Exactly [`FINALE_PLACES`] placements covering places `1..=4` with four
    /// different contestants, all of them (and every extra) on `roster`.
    pub fn new<I>(placements: &[(Uuid, i16)], extras: I, roster: &HashSet<Uuid>) -> Result<Self>
    where
        I: IntoIterator<Item = (Uuid, FinaleBonus)>,
    {
        if placements.len() != FINALE_PLACES as usize {
            return Err(StorageError::invalid_input(format!(
                "finale needs {FINALE_PLACES} placements, got {}",
                placements.len()
            )));
        }

        let places: BTreeSet<i16> = placements.iter().map(|(_, place)| *place).collect();
        if !places.iter().copied().eq(1..=FINALE_PLACES) {
            return Err(StorageError::invalid_input(format!(
                "finale places must be 1 to {FINALE_PLACES}, each used once"
            )));
        }

        let mut by_contestant = BTreeMap::new();
        for (contestant_id, place) in placements {
            ensure_on_roster(*contestant_id, roster)?;
            if by_contestant.insert(*contestant_id, *place).is_some() {
                return Err(StorageError::invalid_input(format!(
                    "contestant {contestant_id} is placed more than once"
                )));
            }
        }

        let mut bonuses = BTreeMap::new();
        for (contestant_id, bonus) in extras {
            ensure_on_roster(contestant_id, roster)?;
            if bonuses.insert(contestant_id, bonus).is_some() {
                return Err(StorageError::invalid_input(format!(
                    "contestant {contestant_id} has more than one set of finale extras"
                )));
            }
        }

        Ok(Self {
            placements: by_contestant,
            extras: bonuses,
        })
    }

    pub fn from_rows(
        placements: &[FinalePlacement],
        extras: &[FinaleExtra],
        roster: &HashSet<Uuid>,
    ) -> Result<Self> {
        let placements: Vec<(Uuid, i16)> = placements
            .iter()
            .map(|p| (p.contestant_id, p.place))
            .collect();
        let extras = extras
            .iter()
            .map(|extra| Ok((extra.contestant_id, FinaleBonus::try_from(extra)?)))
            .collect::<Result<Vec<_>>>()?;

        Self::new(&placements, extras, roster)
    }

    pub fn place_of(&self, contestant_id: Uuid) -> Option<i16> {
        self.placements.get(&contestant_id).copied()
    }

    /// Placement plus bonus points of a contestant, before the multiplier.
    pub fn base_points(&self, contestant_id: Uuid) -> i64 {
        let placement = self.place_of(contestant_id).map_or(0, placement_points);
        let bonus = self
            .extras
            .get(&contestant_id)
            .map_or(0, FinaleBonus::points);
        placement + bonus
    }
}

fn ensure_on_roster(contestant_id: Uuid, roster: &HashSet<Uuid>) -> Result<()> {
    if roster.contains(&contestant_id) {
        Ok(())
    } else {
        Err(StorageError::invalid_input(format!(
            "contestant {contestant_id} is not part of the season"
        )))
    }
}

/// Scores a finale week for every entry.
pub fn score_finale_week(outcome: &FinaleOutcome, entries: &[EntryPicks]) -> Result<EntryTotals> {
    entries
        .iter()
        .map(|entry| {
            let total = weighted_total(entry, |pick| outcome.base_points(pick.contestant_id))?;
            Ok((entry.entry_id, total))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::super::test_support::{contestants, entry};
    use super::*;

    fn outcome(top: [Uuid; 4], extras: Vec<(Uuid, FinaleBonus)>) -> FinaleOutcome {
        let roster: HashSet<Uuid> = top.iter().copied().chain(extras.iter().map(|(id, _)| *id)).collect();
        let placements: Vec<(Uuid, i16)> = top
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as i16 + 1))
            .collect();
        FinaleOutcome::new(&placements, extras, &roster).unwrap()
    }

    #[test]
    fn test_placement_points_stack() {
        assert_eq!(placement_points(1), 90);
        assert_eq!(placement_points(2), 40);
        assert_eq!(placement_points(3), 15);
        assert_eq!(placement_points(4), 15);
        assert_eq!(placement_points(5), 0);
    }

    #[test]
    fn test_winner_without_extras() {
        let top = contestants();
        let outcome = outcome(top, vec![]);

        assert_eq!(outcome.base_points(top[0]), 90);
        assert_eq!(outcome.base_points(top[3]), 15);
        assert_eq!(outcome.base_points(Uuid::new_v4()), 0);
    }

    #[test]
    fn test_runner_up_with_main_win() {
        let [first, second, third, fourth] = contestants();
        let outcome = outcome(
            [first, second, third, fourth],
            vec![(
                second,
                FinaleBonus {
                    main_wins: 1,
                    ..Default::default()
                },
            )],
        );
        let [a, b, c] = contestants();
        // Runner-up drafted into slot 2 (x2.0).
        let entry = entry([a, second, b, c]);

        let totals = score_finale_week(&outcome, std::slice::from_ref(&entry)).unwrap();

        assert_eq!(totals[&entry.entry_id], Decimal::new(130, 0));
    }

    #[test]
    fn test_bonus_counts_every_win() {
        let bonus = FinaleBonus {
            mini_wins: 2,
            main_wins: 3,
            lipsync_wins: 1,
        };
        assert_eq!(bonus.points(), 2 * 15 + 3 * 25 + 10);
    }

    #[test]
    fn test_unplaced_contestant_earns_only_extras() {
        let top = contestants();
        let [outsider] = contestants();
        let outcome = outcome(
            top,
            vec![(
                outsider,
                FinaleBonus {
                    mini_wins: 1,
                    ..Default::default()
                },
            )],
        );

        assert_eq!(outcome.base_points(outsider), 15);
    }

    #[test]
    fn test_full_finale_entry() {
        let [first, second, third, fourth] = contestants();
        let outcome = outcome([first, second, third, fourth], vec![]);
        let entry = entry([fourth, third, second, first]);

        let totals = score_finale_week(&outcome, std::slice::from_ref(&entry)).unwrap();

        // 15*2.5 + 15*2.0 + 40*1.5 + 90*1.0
        assert_eq!(totals[&entry.entry_id], Decimal::new(2175, 1));
    }

    #[test]
    fn test_rejects_wrong_placement_count() {
        let [a, b, c] = contestants();
        let roster = HashSet::from([a, b, c]);
        let err = FinaleOutcome::new(&[(a, 1), (b, 2), (c, 3)], vec![], &roster).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_repeated_place() {
        let [a, b, c, d] = contestants();
        let roster = HashSet::from([a, b, c, d]);
        let err = FinaleOutcome::new(&[(a, 1), (b, 2), (c, 2), (d, 4)], vec![], &roster).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_duplicate_contestant() {
        let [a, b, c] = contestants();
        let roster = HashSet::from([a, b, c]);
        let err = FinaleOutcome::new(&[(a, 1), (b, 2), (c, 3), (a, 4)], vec![], &roster).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_contestant_outside_roster() {
        let [a, b, c, d] = contestants();
        let roster = HashSet::from([a, b, c]);
        let err = FinaleOutcome::new(&[(a, 1), (b, 2), (c, 3), (d, 4)], vec![], &roster).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_extra_count_is_invalid() {
        let extra = FinaleExtra {
            episode_id: Uuid::new_v4(),
            contestant_id: Uuid::new_v4(),
            mini_wins: 0,
            main_wins: -1,
            lipsync_wins: 0,
        };
        assert!(matches!(
            FinaleBonus::try_from(&extra),
            Err(StorageError::InvalidInput(_))
        ));
    }
}
