use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::EpisodeType;

/// Outcome of recomputing the scores of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecomputeSummary {
    pub league_id: Uuid,
    pub episode_id: Uuid,
    pub week: i32,
    pub episode_type: EpisodeType,
    /// Rows removed before scoring, zero on the first computation.
    pub replaced_rows: u64,
    pub scores_written: usize,
}
