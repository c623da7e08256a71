use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::{Episode, EpisodeResult, FinaleExtra, FinalePlacement, ResultType, Score};
use crate::services::scoring::FinaleBonus;

/// Request payload for entering the results of a regular week
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegularWeekRequest {
    #[validate(length(min = 1, message = "Mini winners required"))]
    pub mini_winners: Vec<Uuid>,

    #[validate(length(min = 1, message = "Main winners required"))]
    pub main_winners: Vec<Uuid>,

    pub lipsync_winner: Uuid,

    /// `null` for a non-elimination week.
    #[serde(default)]
    pub eliminated_contestant_id: Option<Uuid>,
}

impl RegularWeekRequest {
    /// Every contestant the payload references.
    pub fn contestant_ids(&self) -> BTreeSet<Uuid> {
        self.mini_winners
            .iter()
            .chain(&self.main_winners)
            .copied()
            .chain(Some(self.lipsync_winner))
            .chain(self.eliminated_contestant_id)
            .collect()
    }

    /// Result rows to store, with repeated winners collapsed.
    pub fn result_rows(&self) -> Vec<(ResultType, Option<Uuid>)> {
        let minis: BTreeSet<Uuid> = self.mini_winners.iter().copied().collect();
        let mains: BTreeSet<Uuid> = self.main_winners.iter().copied().collect();

        minis
            .into_iter()
            .map(|id| (ResultType::Mini, Some(id)))
            .chain(mains.into_iter().map(|id| (ResultType::Main, Some(id))))
            .chain(Some((ResultType::Lipsync, Some(self.lipsync_winner))))
            .chain(
                self.eliminated_contestant_id
                    .map(|id| (ResultType::Elimination, Some(id))),
            )
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlacementInput {
    pub contestant_id: Uuid,
    pub place: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FinaleExtraInput {
    pub contestant_id: Uuid,

    #[serde(default)]
    #[validate(range(min = 0, message = "Win counts cannot be negative"))]
    pub mini_wins: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Win counts cannot be negative"))]
    pub main_wins: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Win counts cannot be negative"))]
    pub lipsync_wins: i32,
}

impl FinaleExtraInput {
    pub fn as_row(&self) -> (Uuid, i32, i32, i32) {
        (
            self.contestant_id,
            self.mini_wins,
            self.main_wins,
            self.lipsync_wins,
        )
    }

    pub fn bonus(&self) -> Result<FinaleBonus> {
        FinaleBonus::from_counts(
            self.contestant_id,
            self.mini_wins,
            self.main_wins,
            self.lipsync_wins,
        )
    }
}

/// Request payload for entering finale placements and bonus wins
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FinaleWeekRequest {
    #[validate(length(equal = 4, message = "placements must be an array of 4 items"))]
    pub placements: Vec<PlacementInput>,

    #[serde(default)]
    #[validate(nested)]
    pub extras: Vec<FinaleExtraInput>,

    /// Marks the league complete once the finale is stored.
    #[serde(default)]
    pub finalize: bool,
}

impl FinaleWeekRequest {
    pub fn placement_rows(&self) -> Vec<(Uuid, i16)> {
        self.placements
            .iter()
            .map(|p| (p.contestant_id, p.place))
            .collect()
    }
}

/// Stored results of one week and the scores computed from them. Regular
/// weeks fill `results`, finales fill `placements` and `extras`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekDetail {
    pub episode: Episode,
    pub results: Vec<EpisodeResult>,
    pub placements: Vec<FinalePlacement>,
    pub extras: Vec<FinaleExtra>,
    pub scores: Vec<Score>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_request_requires_winners() {
        let request = RegularWeekRequest {
            mini_winners: vec![],
            main_winners: vec![Uuid::new_v4()],
            lipsync_winner: Uuid::new_v4(),
            eliminated_contestant_id: None,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("mini_winners"));
    }

    #[test]
    fn test_result_rows_collapse_repeats() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let request = RegularWeekRequest {
            mini_winners: vec![a, a],
            main_winners: vec![b],
            lipsync_winner: c,
            eliminated_contestant_id: Some(b),
        };

        let rows = request.result_rows();

        assert_eq!(
            rows,
            vec![
                (ResultType::Mini, Some(a)),
                (ResultType::Main, Some(b)),
                (ResultType::Lipsync, Some(c)),
                (ResultType::Elimination, Some(b)),
            ]
        );
        assert_eq!(request.contestant_ids(), BTreeSet::from([a, b, c]));
    }

    #[test]
    fn test_regular_request_deserializes_without_elimination() {
        let json = format!(
            r#"{{"mini_winners":["{a}"],"main_winners":["{a}"],"lipsync_winner":"{a}"}}"#,
            a = Uuid::nil()
        );

        let request: RegularWeekRequest = serde_json::from_str(&json).unwrap();

        assert!(request.eliminated_contestant_id.is_none());
        assert!(request.result_rows().iter().all(|(t, _)| *t != ResultType::Elimination));
    }

    #[test]
    fn test_finale_request_validates_extras() {
        let request = FinaleWeekRequest {
            placements: (1..=4)
                .map(|place| PlacementInput {
                    contestant_id: Uuid::new_v4(),
                    place,
                })
                .collect(),
            extras: vec![FinaleExtraInput {
                contestant_id: Uuid::new_v4(),
                mini_wins: -1,
                main_wins: 0,
                lipsync_wins: 0,
            }],
            finalize: false,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("extras"));
    }

    #[test]
    fn test_negative_bonus_count_is_rejected() {
        let extra = FinaleExtraInput {
            contestant_id: Uuid::new_v4(),
            mini_wins: 1,
            main_wins: -2,
            lipsync_wins: 0,
        };

        assert!(matches!(
            extra.bonus(),
            Err(crate::error::StorageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bonus_keeps_counts() {
        let extra = FinaleExtraInput {
            contestant_id: Uuid::new_v4(),
            mini_wins: 1,
            main_wins: 2,
            lipsync_wins: 3,
        };

        assert_eq!(
            extra.bonus().unwrap(),
            FinaleBonus {
                mini_wins: 1,
                main_wins: 2,
                lipsync_wins: 3,
            }
        );
    }

    #[test]
    fn test_finale_request_requires_four_placements() {
        let request = FinaleWeekRequest {
            placements: vec![PlacementInput {
                contestant_id: Uuid::new_v4(),
                place: 1,
            }],
            extras: vec![],
            finalize: true,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("placements"));
    }
}
