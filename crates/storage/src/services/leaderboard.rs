use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::leaderboard::{LeaderboardPick, LeaderboardRow};
use crate::error::Result;
use crate::models::{Entry, WeeklyScore};
use crate::repository::{
    entry::EntryRepository, episode::EpisodeRepository, league::LeagueRepository,
    score::ScoreRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankableEntry {
    pub entry_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Entry> for RankableEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            entry_id: entry.entry_id,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub entry_id: Uuid,
    pub total_points: Decimal,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub entry_id: Uuid,
    pub total_points: Decimal,
    pub rank: i64,
    pub last_week_rank: Option<i64>,
    pub delta_rank: Option<i64>,
}

/// Orders entries by total points and assigns competition ranks.
///
/// Higher totals first; equal totals keep the older entry ahead and share
/// the rank of the first entry of the tie, so `[10, 10, 8]` ranks
/// `[1, 1, 3]`. Entries missing from `totals` count as zero.
pub fn build_leaderboard(
    entries: &[RankableEntry],
    totals: &HashMap<Uuid, Decimal>,
) -> Vec<RankedEntry> {
    let mut rows: Vec<(RankableEntry, Decimal)> = entries
        .iter()
        .map(|entry| {
            let total = totals.get(&entry.entry_id).copied().unwrap_or(Decimal::ZERO);
            (*entry, total)
        })
        .collect();

    rows.sort_by(|(a, a_total), (b, b_total)| {
        b_total
            .cmp(a_total)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    let mut ranked = Vec::with_capacity(rows.len());
    let mut previous: Option<(Decimal, i64)> = None;

    for (index, (entry, total)) in rows.into_iter().enumerate() {
        let rank = match previous {
            Some((previous_total, previous_rank)) if previous_total == total => previous_rank,
            _ => index as i64 + 1,
        };
        previous = Some((total, rank));

        ranked.push(RankedEntry {
            entry_id: entry.entry_id,
            total_points: total,
            rank,
        });
    }

    ranked
}

/// Sums score rows per entry, keeping only weeks up to `cutoff` when given.
fn cumulative_totals(scores: &[&WeeklyScore], cutoff: Option<i32>) -> HashMap<Uuid, Decimal> {
    let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
    for score in scores {
        if cutoff.is_some_and(|week| score.week > week) {
            continue;
        }
        *totals.entry(score.entry_id).or_insert(Decimal::ZERO) += score.points;
    }
    totals
}

/// Ranks entries on their cumulative totals and, once at least two weeks
/// have been scored, computes each entry's movement since the previous
/// scored week.
///
/// Score rows of entries not in `entries` are ignored.
pub fn standings_with_movement(entries: &[RankableEntry], scores: &[WeeklyScore]) -> Vec<Standing> {
    let known: HashSet<Uuid> = entries.iter().map(|entry| entry.entry_id).collect();
    let scores: Vec<&WeeklyScore> = scores
        .iter()
        .filter(|score| known.contains(&score.entry_id))
        .collect();

    let current = build_leaderboard(entries, &cumulative_totals(&scores, None));

    let weeks: BTreeSet<i32> = scores.iter().map(|score| score.week).collect();
    let previous_ranks: Option<HashMap<Uuid, i64>> = weeks.iter().rev().nth(1).map(|&week| {
        build_leaderboard(entries, &cumulative_totals(&scores, Some(week)))
            .into_iter()
            .map(|ranked| (ranked.entry_id, ranked.rank))
            .collect()
    });

    current
        .into_iter()
        .map(|ranked| {
            let last_week_rank = previous_ranks
                .as_ref()
                .and_then(|ranks| ranks.get(&ranked.entry_id).copied());
            Standing {
                entry_id: ranked.entry_id,
                total_points: ranked.total_points,
                rank: ranked.rank,
                last_week_rank,
                delta_rank: last_week_rank.map(|last| last - ranked.rank),
            }
        })
        .collect()
}

/// Builds the leaderboard of a league from a single consistent snapshot of
/// its entries, picks and scores.
pub async fn league_leaderboard(pool: &PgPool, league_id: Uuid) -> Result<Vec<LeaderboardRow>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    LeagueRepository::new(&mut *tx).find_by_id(league_id).await?;

    let mut entries_repo = EntryRepository::new(&mut *tx);
    let entries = entries_repo.list_by_league(league_id).await?;
    let picks = entries_repo.picks_by_league(league_id).await?;

    let scores = ScoreRepository::new(&mut *tx).weekly_scores(league_id).await?;
    let eliminated: HashSet<Uuid> = EpisodeRepository::new(&mut *tx)
        .eliminations(league_id)
        .await?
        .into_iter()
        .collect();

    tx.commit().await?;

    let rankable: Vec<RankableEntry> = entries.iter().map(RankableEntry::from).collect();
    let standings = standings_with_movement(&rankable, &scores);

    let user_by_entry: HashMap<Uuid, &str> = entries
        .iter()
        .map(|entry| (entry.entry_id, entry.user_id.as_str()))
        .collect();
    let mut picks_by_entry: HashMap<Uuid, Vec<LeaderboardPick>> = HashMap::new();
    for pick in picks {
        picks_by_entry
            .entry(pick.entry_id)
            .or_default()
            .push(LeaderboardPick {
                slot: pick.slot,
                contestant_id: pick.contestant_id,
                eliminated: eliminated.contains(&pick.contestant_id),
                contestant_name: pick.contestant_name,
                multiplier: pick.multiplier,
            });
    }

    let rows = standings
        .into_iter()
        .map(|standing| {
            let mut picks = picks_by_entry.remove(&standing.entry_id).unwrap_or_default();
            picks.sort_by_key(|pick| pick.slot);
            LeaderboardRow {
                entry_id: standing.entry_id,
                user_id: user_by_entry
                    .get(&standing.entry_id)
                    .map(|user| user.to_string())
                    .unwrap_or_default(),
                total_points: standing.total_points,
                rank: standing.rank,
                last_week_rank: standing.last_week_rank,
                delta_rank: standing.delta_rank,
                picks,
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn entries(count: usize) -> Vec<RankableEntry> {
        let start = Utc.with_ymd_and_hms(2025, 12, 20, 18, 0, 0).unwrap();
        (0..count)
            .map(|i| RankableEntry {
                entry_id: Uuid::new_v4(),
                created_at: start + Duration::minutes(i as i64),
            })
            .collect()
    }

    fn points(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn score(entry: &RankableEntry, week: i32, value: i64) -> WeeklyScore {
        WeeklyScore {
            entry_id: entry.entry_id,
            week,
            points: points(value),
        }
    }

    #[test]
    fn test_rank_tie_law() {
        let entries = entries(5);
        let totals: HashMap<Uuid, Decimal> = entries
            .iter()
            .zip([100, 100, 80, 80, 50])
            .map(|(entry, total)| (entry.entry_id, points(total)))
            .collect();

        let ranks: Vec<i64> = build_leaderboard(&entries, &totals)
            .iter()
            .map(|ranked| ranked.rank)
            .collect();

        assert_eq!(ranks, vec![1, 1, 3, 3, 5]);
    }

    #[test]
    fn test_tie_orders_older_entry_first_with_equal_rank() {
        let entries = entries(2);
        let (older, newer) = (entries[0], entries[1]);
        let totals = HashMap::from([(older.entry_id, points(75)), (newer.entry_id, points(75))]);

        // Input order must not matter.
        let ranked = build_leaderboard(&[newer, older], &totals);

        assert_eq!(ranked[0].entry_id, older.entry_id);
        assert_eq!(ranked[1].entry_id, newer.entry_id);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 1);
    }

    #[test]
    fn test_tie_compares_decimal_values_not_scale() {
        let entries = entries(2);
        let totals = HashMap::from([
            (entries[0].entry_id, Decimal::new(1085, 1)),
            (entries[1].entry_id, Decimal::new(10850, 2)),
        ]);

        let ranked = build_leaderboard(&entries, &totals);

        assert!(ranked.iter().all(|r| r.rank == 1));
    }

    #[test]
    fn test_entry_without_scores_totals_zero() {
        let entries = entries(2);
        let totals = HashMap::from([(entries[1].entry_id, points(3))]);

        let ranked = build_leaderboard(&entries, &totals);

        assert_eq!(ranked[0].entry_id, entries[1].entry_id);
        assert_eq!(ranked[1].total_points, Decimal::ZERO);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_single_scored_week_has_no_movement() {
        let entries = entries(3);
        let scores = vec![
            score(&entries[0], 1, 10),
            score(&entries[1], 1, 20),
            score(&entries[2], 1, 5),
        ];

        let standings = standings_with_movement(&entries, &scores);

        assert_eq!(standings.len(), 3);
        assert!(standings.iter().all(|s| s.last_week_rank.is_none()));
        assert!(standings.iter().all(|s| s.delta_rank.is_none()));
    }

    #[test]
    fn test_no_scores_has_no_movement() {
        let entries = entries(2);

        let standings = standings_with_movement(&entries, &[]);

        assert!(standings.iter().all(|s| s.delta_rank.is_none() && s.rank == 1));
    }

    #[test]
    fn test_movement_between_last_two_weeks() {
        let entries = entries(3);
        let (a, b, c) = (&entries[0], &entries[1], &entries[2]);
        let scores = vec![
            // Week 1: a 30, b 20, c 10
            score(a, 1, 30),
            score(b, 1, 20),
            score(c, 1, 10),
            // Week 2: a 31, b 45, c 11
            score(a, 2, 1),
            score(b, 2, 25),
            score(c, 2, 1),
            // Week 4: a 32, b 46, c 61
            score(a, 4, 1),
            score(b, 4, 1),
            score(c, 4, 50),
        ];

        let standings = standings_with_movement(&entries, &scores);
        let by_entry: HashMap<Uuid, &Standing> =
            standings.iter().map(|s| (s.entry_id, s)).collect();

        // Compared against the cumulative ranks after week 2.
        assert_eq!(by_entry[&c.entry_id].rank, 1);
        assert_eq!(by_entry[&c.entry_id].last_week_rank, Some(3));
        assert_eq!(by_entry[&c.entry_id].delta_rank, Some(2));

        assert_eq!(by_entry[&b.entry_id].rank, 2);
        assert_eq!(by_entry[&b.entry_id].last_week_rank, Some(1));
        assert_eq!(by_entry[&b.entry_id].delta_rank, Some(-1));

        assert_eq!(by_entry[&a.entry_id].rank, 3);
        assert_eq!(by_entry[&a.entry_id].delta_rank, Some(-1));

        assert_eq!(by_entry[&c.entry_id].total_points, points(61));
    }

    #[test]
    fn test_scores_of_unknown_entries_are_ignored() {
        let entries = entries(1);
        let stranger = RankableEntry {
            entry_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let scores = vec![score(&entries[0], 1, 4), score(&stranger, 2, 100)];

        let standings = standings_with_movement(&entries, &scores);

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].total_points, points(4));
        assert!(standings[0].delta_rank.is_none());
    }
}
