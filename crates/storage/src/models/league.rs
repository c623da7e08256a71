use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeagueStatus {
    Active,
    Complete,
}

impl LeagueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for LeagueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeagueStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "COMPLETE" => Ok(Self::Complete),
            other => Err(StorageError::data_integrity(format!(
                "unknown league status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct League {
    pub league_id: Uuid,
    pub name: String,
    pub season_key: String,
    /// Premiere time. Picks lock and results open at this point.
    pub starts_at: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
    /// Set when the commissioner starts the league ahead of the premiere.
    pub started_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl League {
    /// Whether results may be entered at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.started_at.is_some() || self.starts_at.is_some_and(|starts_at| now >= starts_at)
    }
}
