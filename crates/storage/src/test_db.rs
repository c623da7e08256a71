//! Postgres fixtures for tests that need a live database. Tests using them
//! return early when `DATABASE_URL` is unset.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::models::Score;
use crate::repository::score::ScoreRepository;

pub const SEASON: &str = "RPDR_S18";

pub async fn pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

pub struct SeededLeague {
    pub league_id: Uuid,
    /// Season roster ordered by name.
    pub roster: Vec<Uuid>,
    /// First entry drafts `roster[0..4]`, second drafts `roster[4..8]`.
    pub entries: Vec<Uuid>,
}

pub fn reference_multipliers() -> [Decimal; 4] {
    [
        Decimal::new(25, 1),
        Decimal::new(20, 1),
        Decimal::new(15, 1),
        Decimal::new(10, 1),
    ]
}

/// Creates a started league with two full entries.
pub async fn seed_league(pool: &PgPool) -> SeededLeague {
    let league_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO leagues (name, season_key, starts_at)
        VALUES ('Werk Room', $1, now() - interval '1 day')
        RETURNING league_id
        "#,
    )
    .bind(SEASON)
    .fetch_one(pool)
    .await
    .unwrap();

    let roster: Vec<Uuid> = sqlx::query_scalar(
        "SELECT contestant_id FROM contestants WHERE season_key = $1 ORDER BY name",
    )
    .bind(SEASON)
    .fetch_all(pool)
    .await
    .unwrap();

    let mut entries = Vec::new();
    for (user_id, drafted) in [("alice", &roster[0..4]), ("bob", &roster[4..8])] {
        let entry_id = add_entry(pool, league_id, user_id).await;
        for (i, (contestant_id, multiplier)) in
            drafted.iter().zip(reference_multipliers()).enumerate()
        {
            add_pick(pool, entry_id, i as i16 + 1, *contestant_id, multiplier).await;
        }
        entries.push(entry_id);
    }

    SeededLeague {
        league_id,
        roster,
        entries,
    }
}

pub async fn add_entry(pool: &PgPool, league_id: Uuid, user_id: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO league_entries (league_id, user_id) VALUES ($1, $2) RETURNING entry_id",
    )
    .bind(league_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn add_pick(
    pool: &PgPool,
    entry_id: Uuid,
    slot: i16,
    contestant_id: Uuid,
    multiplier: Decimal,
) {
    sqlx::query(
        r#"
        INSERT INTO league_entry_picks (entry_id, slot, contestant_id, multiplier)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entry_id)
    .bind(slot)
    .bind(contestant_id)
    .bind(multiplier)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn scores(pool: &PgPool, episode_id: Uuid) -> Vec<Score> {
    let mut conn = pool.acquire().await.unwrap();
    ScoreRepository::new(&mut *conn)
        .list_for_episode(episode_id)
        .await
        .unwrap()
}
