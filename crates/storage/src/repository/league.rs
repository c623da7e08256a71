use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{League, LeagueStatus};

/// Repository for League database operations
pub struct LeagueRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> LeagueRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a league by ID
    pub async fn find_by_id(&mut self, league_id: Uuid) -> Result<League> {
        let league = sqlx::query_as::<_, League>(
            r#"
            SELECT league_id, name, season_key, starts_at, submission_deadline,
                   started_at, status, created_at
            FROM leagues
            WHERE league_id = $1
            "#,
        )
        .bind(league_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(league)
    }

    pub async fn set_status(&mut self, league_id: Uuid, status: LeagueStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE leagues
            SET status = $2
            WHERE league_id = $1
            "#,
        )
        .bind(league_id)
        .bind(status.as_str())
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
