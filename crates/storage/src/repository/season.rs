use sqlx::PgConnection;

use crate::error::Result;
use crate::models::{Contestant, SeasonRules, SlotMultiplier};

pub struct SeasonRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> SeasonRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Loads the draft rule set of a season.
    pub async fn rules(&mut self, season_key: &str) -> Result<SeasonRules> {
        let rows = sqlx::query_as::<_, SlotMultiplier>(
            r#"
            SELECT season_key, slot, multiplier
            FROM season_slot_multipliers
            WHERE season_key = $1
            ORDER BY slot
            "#,
        )
        .bind(season_key)
        .fetch_all(&mut *self.conn)
        .await?;

        SeasonRules::from_rows(season_key, rows)
    }

    /// Lists the contestants of a season, by name.
    pub async fn roster(&mut self, season_key: &str) -> Result<Vec<Contestant>> {
        let contestants = sqlx::query_as::<_, Contestant>(
            r#"
            SELECT contestant_id, season_key, name, created_at
            FROM contestants
            WHERE season_key = $1
            ORDER BY name ASC
            "#,
        )
        .bind(season_key)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(contestants)
    }
}
