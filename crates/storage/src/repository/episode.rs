use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Episode, EpisodeResult, EpisodeType, FinaleExtra, FinalePlacement, ResultType};

/// Repository for episodes and their result rows
pub struct EpisodeRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EpisodeRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Loads an episode and takes a row lock on it for the rest of the
    /// transaction. Concurrent recomputes of the same episode queue here.
    pub async fn find_for_update(&mut self, episode_id: Uuid) -> Result<Option<Episode>> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT episode_id, league_id, week, episode_type, created_at
            FROM episodes
            WHERE episode_id = $1
            FOR UPDATE
            "#,
        )
        .bind(episode_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(episode)
    }

    pub async fn find_by_week(&mut self, league_id: Uuid, week: i32) -> Result<Option<Episode>> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT episode_id, league_id, week, episode_type, created_at
            FROM episodes
            WHERE league_id = $1 AND week = $2
            "#,
        )
        .bind(league_id)
        .bind(week)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(episode)
    }

    /// Locking variant of [`Self::find_by_week`]. Writers take this lock
    /// before touching any child rows of the episode.
    pub async fn find_by_week_for_update(
        &mut self,
        league_id: Uuid,
        week: i32,
    ) -> Result<Option<Episode>> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            SELECT episode_id, league_id, week, episode_type, created_at
            FROM episodes
            WHERE league_id = $1 AND week = $2
            FOR UPDATE
            "#,
        )
        .bind(league_id)
        .bind(week)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(episode)
    }

    /// Returns the episode of `(league_id, week)`, creating it with
    /// `episode_type` when missing. An existing episode keeps its type.
    /// The returned row stays locked until the transaction ends.
    pub async fn get_or_create(
        &mut self,
        league_id: Uuid,
        week: i32,
        episode_type: EpisodeType,
    ) -> Result<Episode> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            INSERT INTO episodes (league_id, week, episode_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (league_id, week)
            DO UPDATE SET episode_type = episodes.episode_type
            RETURNING episode_id, league_id, week, episode_type, created_at
            "#,
        )
        .bind(league_id)
        .bind(week)
        .bind(episode_type.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(episode)
    }

    /// Creates or retypes the episode of `(league_id, week)`.
    pub async fn upsert_type(
        &mut self,
        league_id: Uuid,
        week: i32,
        episode_type: EpisodeType,
    ) -> Result<Episode> {
        let episode = sqlx::query_as::<_, Episode>(
            r#"
            INSERT INTO episodes (league_id, week, episode_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (league_id, week)
            DO UPDATE SET episode_type = EXCLUDED.episode_type
            RETURNING episode_id, league_id, week, episode_type, created_at
            "#,
        )
        .bind(league_id)
        .bind(week)
        .bind(episode_type.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(episode)
    }

    pub async fn results(&mut self, episode_id: Uuid) -> Result<Vec<EpisodeResult>> {
        let results = sqlx::query_as::<_, EpisodeResult>(
            r#"
            SELECT result_id, episode_id, result_type, contestant_id
            FROM episode_results
            WHERE episode_id = $1
            ORDER BY result_type, contestant_id
            "#,
        )
        .bind(episode_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    pub async fn finale_placements(&mut self, episode_id: Uuid) -> Result<Vec<FinalePlacement>> {
        let placements = sqlx::query_as::<_, FinalePlacement>(
            r#"
            SELECT episode_id, contestant_id, place
            FROM episode_finale_placements
            WHERE episode_id = $1
            ORDER BY place
            "#,
        )
        .bind(episode_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(placements)
    }

    pub async fn finale_extras(&mut self, episode_id: Uuid) -> Result<Vec<FinaleExtra>> {
        let extras = sqlx::query_as::<_, FinaleExtra>(
            r#"
            SELECT episode_id, contestant_id, mini_wins, main_wins, lipsync_wins
            FROM episode_finale_extras
            WHERE episode_id = $1
            ORDER BY contestant_id
            "#,
        )
        .bind(episode_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(extras)
    }

    /// Replaces every result row of a regular episode.
    pub async fn replace_results(
        &mut self,
        episode_id: Uuid,
        results: &[(ResultType, Option<Uuid>)],
    ) -> Result<()> {
        sqlx::query("DELETE FROM episode_results WHERE episode_id = $1")
            .bind(episode_id)
            .execute(&mut *self.conn)
            .await?;

        if results.is_empty() {
            return Ok(());
        }

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO episode_results (episode_id, result_type, contestant_id) ");
        query.push_values(results, |mut row, (result_type, contestant_id)| {
            row.push_bind(episode_id)
                .push_bind(result_type.as_str())
                .push_bind(*contestant_id);
        });
        query.build().execute(&mut *self.conn).await?;

        Ok(())
    }

    /// Replaces the placements and extras of a finale episode.
    pub async fn replace_finale(
        &mut self,
        episode_id: Uuid,
        placements: &[(Uuid, i16)],
        extras: &[(Uuid, i32, i32, i32)],
    ) -> Result<()> {
        sqlx::query("DELETE FROM episode_finale_placements WHERE episode_id = $1")
            .bind(episode_id)
            .execute(&mut *self.conn)
            .await?;
        sqlx::query("DELETE FROM episode_finale_extras WHERE episode_id = $1")
            .bind(episode_id)
            .execute(&mut *self.conn)
            .await?;

        if !placements.is_empty() {
            let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO episode_finale_placements (episode_id, contestant_id, place) ",
            );
            query.push_values(placements, |mut row, (contestant_id, place)| {
                row.push_bind(episode_id)
                    .push_bind(*contestant_id)
                    .push_bind(*place);
            });
            query
                .build()
                .execute(&mut *self.conn)
                .await
                .map_err(|e| {
                    StorageError::from(e).on_unique_violation("Finale placement already stored")
                })?;
        }

        if !extras.is_empty() {
            let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO episode_finale_extras (episode_id, contestant_id, mini_wins, main_wins, lipsync_wins) ",
            );
            query.push_values(extras, |mut row, (contestant_id, mini, main, lipsync)| {
                row.push_bind(episode_id)
                    .push_bind(*contestant_id)
                    .push_bind(*mini)
                    .push_bind(*main)
                    .push_bind(*lipsync);
            });
            query
                .build()
                .execute(&mut *self.conn)
                .await
                .map_err(|e| {
                    StorageError::from(e).on_unique_violation("Finale extras listed twice")
                })?;
        }

        Ok(())
    }

    /// Contestants eliminated in regular episodes of the league before `week`.
    pub async fn eliminations_before_week(&mut self, league_id: Uuid, week: i32) -> Result<Vec<Uuid>> {
        let eliminated = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT r.contestant_id
            FROM episode_results r
            INNER JOIN episodes e ON e.episode_id = r.episode_id
            WHERE e.league_id = $1
              AND e.week < $2
              AND e.episode_type = 'REGULAR'
              AND r.result_type = 'elimination'
              AND r.contestant_id IS NOT NULL
            "#,
        )
        .bind(league_id)
        .bind(week)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(eliminated)
    }

    /// Contestants eliminated in any regular episode of the league so far.
    pub async fn eliminations(&mut self, league_id: Uuid) -> Result<Vec<Uuid>> {
        let eliminated = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT r.contestant_id
            FROM episode_results r
            INNER JOIN episodes e ON e.episode_id = r.episode_id
            WHERE e.league_id = $1
              AND e.episode_type = 'REGULAR'
              AND r.result_type = 'elimination'
              AND r.contestant_id IS NOT NULL
            "#,
        )
        .bind(league_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(eliminated)
    }
}
