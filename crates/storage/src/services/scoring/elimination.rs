use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::repository::episode::EpisodeRepository;

/// Contestants that can no longer earn points: everyone eliminated in an
/// earlier week plus this week's elimination, if there was one.
pub fn permanently_eliminated<I>(prior_eliminations: I, this_week: Option<Uuid>) -> HashSet<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    prior_eliminations.into_iter().chain(this_week).collect()
}

/// Loads the eliminations of regular episodes before `week` and folds in
/// this week's elimination.
pub async fn eliminated_before_week(
    conn: &mut PgConnection,
    league_id: Uuid,
    week: i32,
    this_week: Option<Uuid>,
) -> Result<HashSet<Uuid>> {
    let prior = EpisodeRepository::new(conn)
        .eliminations_before_week(league_id, week)
        .await?;

    Ok(permanently_eliminated(prior, this_week))
}
