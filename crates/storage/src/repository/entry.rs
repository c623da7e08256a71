use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Entry, Pick};

/// Read access to league entries and their picks
pub struct EntryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EntryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Lists the entries of a league, oldest first.
    pub async fn list_by_league(&mut self, league_id: Uuid) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(
            r#"
            SELECT entry_id, league_id, user_id, created_at
            FROM league_entries
            WHERE league_id = $1
            ORDER BY created_at ASC, entry_id ASC
            "#,
        )
        .bind(league_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }

    /// Lists every pick of every entry in a league.
    pub async fn picks_by_league(&mut self, league_id: Uuid) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(
            r#"
            SELECT p.entry_id, p.slot, p.contestant_id, c.name AS contestant_name, p.multiplier
            FROM league_entry_picks p
            INNER JOIN league_entries le ON le.entry_id = p.entry_id
            INNER JOIN contestants c ON c.contestant_id = p.contestant_id
            WHERE le.league_id = $1
            ORDER BY p.entry_id, p.slot
            "#,
        )
        .bind(league_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(picks)
    }
}
