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
pub enum EpisodeType {
    Regular,
    Finale,
}

impl EpisodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Finale => "FINALE",
        }
    }
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(Self::Regular),
            "FINALE" => Ok(Self::Finale),
            other => Err(StorageError::data_integrity(format!(
                "unknown episode type '{other}'"
            ))),
        }
    }
}

/// Kind of a weekly result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Mini,
    Main,
    Lipsync,
    Elimination,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mini => "mini",
            Self::Main => "main",
            Self::Lipsync => "lipsync",
            Self::Elimination => "elimination",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mini" => Ok(Self::Mini),
            "main" => Ok(Self::Main),
            "lipsync" => Ok(Self::Lipsync),
            "elimination" => Ok(Self::Elimination),
            other => Err(StorageError::data_integrity(format!(
                "unknown result type '{other}'"
            ))),
        }
    }
}

/// One scored week of a league. `(league_id, week)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Episode {
    pub episode_id: Uuid,
    pub league_id: Uuid,
    pub week: i32,
    pub episode_type: String,
    pub created_at: DateTime<Utc>,
}

impl Episode {
    pub fn episode_type(&self) -> Result<EpisodeType, StorageError> {
        self.episode_type.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EpisodeResult {
    pub result_id: Uuid,
    pub episode_id: Uuid,
    pub result_type: String,
    /// Empty for a week without an elimination.
    pub contestant_id: Option<Uuid>,
}

impl EpisodeResult {
    pub fn result_type(&self) -> Result<ResultType, StorageError> {
        self.result_type.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FinalePlacement {
    pub episode_id: Uuid,
    pub contestant_id: Uuid,
    pub place: i16,
}

/// Extra challenge wins credited to a contestant during the finale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FinaleExtra {
    pub episode_id: Uuid,
    pub contestant_id: Uuid,
    pub mini_wins: i32,
    pub main_wins: i32,
    pub lipsync_wins: i32,
}
