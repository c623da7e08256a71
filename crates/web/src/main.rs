use std::time::Duration;

use anyhow::Context;
use axum::Router;
use storage::Database;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::leaderboard::handlers::get_leaderboard,
        features::weeks::handlers::get_week,
        features::weeks::handlers::save_regular_week,
        features::weeks::handlers::mark_finale,
        features::weeks::handlers::save_finale_week,
        features::weeks::handlers::recompute_episode,
    ),
    components(
        schemas(
            storage::dto::leaderboard::LeaderboardRow,
            storage::dto::leaderboard::LeaderboardPick,
            storage::dto::results::RegularWeekRequest,
            storage::dto::results::FinaleWeekRequest,
            storage::dto::results::PlacementInput,
            storage::dto::results::FinaleExtraInput,
            storage::dto::results::WeekDetail,
            storage::dto::scoring::RecomputeSummary,
            storage::models::League,
            storage::models::LeagueStatus,
            storage::models::Episode,
            storage::models::EpisodeType,
            storage::models::EpisodeResult,
            storage::models::FinalePlacement,
            storage::models::FinaleExtra,
            storage::models::Score,
        )
    ),
    tags(
        (name = "leaderboard", description = "Public league standings"),
        (name = "weeks", description = "Weekly results: public read, protected entry and rescoring"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting league scoring API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, results endpoints will reject every request");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(features::routes(api_keys))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(db);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
