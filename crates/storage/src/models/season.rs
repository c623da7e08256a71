use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{Result, StorageError};

/// Multiplier attached to one draft slot of a season's rule set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SlotMultiplier {
    pub season_key: String,
    pub slot: i16,
    pub multiplier: Decimal,
}

/// Draft rules of a season: how many slots an entry fills and the multiplier
/// each slot carries.
///
/// The reference rule set (`RPDR_S18`) has four slots weighted
/// 2.5 / 2.0 / 1.5 / 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRules {
    season_key: String,
    multipliers: BTreeMap<i16, Decimal>,
}

impl SeasonRules {
    pub fn new(season_key: impl Into<String>, multipliers: BTreeMap<i16, Decimal>) -> Self {
        Self {
            season_key: season_key.into(),
            multipliers,
        }
    }

    /// Builds the rules from stored rows. Slots must be exactly `1..=K`.
    pub fn from_rows(season_key: &str, rows: Vec<SlotMultiplier>) -> Result<Self> {
        if rows.is_empty() {
            return Err(StorageError::data_integrity(format!(
                "season '{season_key}' has no slot multipliers"
            )));
        }

        let multipliers: BTreeMap<i16, Decimal> = rows
            .into_iter()
            .map(|row| (row.slot, row.multiplier))
            .collect();

        let contiguous = multipliers
            .keys()
            .copied()
            .eq(1..=multipliers.len() as i16);
        if !contiguous {
            return Err(StorageError::data_integrity(format!(
                "season '{season_key}' slots are not numbered 1..{}",
                multipliers.len()
            )));
        }

        Ok(Self::new(season_key, multipliers))
    }

    pub fn season_key(&self) -> &str {
        &self.season_key
    }

    /// Number of picks a complete entry holds.
    pub fn slot_count(&self) -> usize {
        self.multipliers.len()
    }

    pub fn has_slot(&self, slot: i16) -> bool {
        self.multipliers.contains_key(&slot)
    }

    pub fn multiplier_for(&self, slot: i16) -> Option<Decimal> {
        self.multipliers.get(&slot).copied()
    }

    /// Whether `multiplier` is one of the values the rule set hands out.
    pub fn is_known_multiplier(&self, multiplier: Decimal) -> bool {
        self.multipliers.values().any(|m| *m == multiplier)
    }
}
