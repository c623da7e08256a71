use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{
    get_week, mark_finale, recompute_episode, save_finale_week, save_regular_week,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:league_id/weeks/:week", put(save_regular_week))
        .route(
            "/:league_id/weeks/:week/finale",
            post(mark_finale).put(save_finale_week),
        )
        .route(
            "/:league_id/episodes/:episode_id/recompute",
            post(recompute_episode),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:league_id/weeks/:week", get(get_week))
        .merge(protected)
}
