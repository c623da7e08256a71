use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Score, WeeklyScore};

pub struct ScoreRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ScoreRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn delete_for_episode(&mut self, episode_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM league_entry_scores WHERE episode_id = $1")
            .bind(episode_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Bulk-inserts one row per `(entry_id, points)` for the episode.
    pub async fn insert_for_episode(
        &mut self,
        episode_id: Uuid,
        points: &[(Uuid, Decimal)],
    ) -> Result<Vec<Score>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO league_entry_scores (entry_id, episode_id, points) ");
        query.push_values(points, |mut row, (entry_id, points)| {
            row.push_bind(*entry_id)
                .push_bind(episode_id)
                .push_bind(*points);
        });
        query.push(" RETURNING entry_id, episode_id, points, computed_at");

        let scores: Vec<Score> = query.build_query_as().fetch_all(&mut *self.conn).await?;

        Ok(scores)
    }

    pub async fn list_for_episode(&mut self, episode_id: Uuid) -> Result<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"
            SELECT entry_id, episode_id, points, computed_at
            FROM league_entry_scores
            WHERE episode_id = $1
            ORDER BY entry_id
            "#,
        )
        .bind(episode_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(scores)
    }

    /// Every score row of a league together with the week it belongs to.
    pub async fn weekly_scores(&mut self, league_id: Uuid) -> Result<Vec<WeeklyScore>> {
        let scores = sqlx::query_as::<_, WeeklyScore>(
            r#"
            SELECT s.entry_id, e.week, s.points
            FROM league_entry_scores s
            INNER JOIN episodes e ON e.episode_id = s.episode_id
            WHERE e.league_id = $1
            ORDER BY e.week, s.entry_id
            "#,
        )
        .bind(league_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(scores)
    }
}
