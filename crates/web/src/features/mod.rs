use axum::Router;
use storage::Database;

use crate::middleware::auth::ApiKeys;

pub mod leaderboard;
pub mod weeks;

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new().nest(
        "/api/leagues",
        leaderboard::routes::routes().merge(weeks::routes::routes(api_keys)),
    )
}
