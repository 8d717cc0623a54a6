use axum_helpers::server::{create_production_app, health_router};
use core_config::app_info;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first so even config errors render nicely
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    // Connect to PostgreSQL with startup retry, then bring the schema up
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, "taskforge_api")
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let jwt_auth = axum_helpers::JwtAuth::new(&config.jwt);

    let state = AppState { config, db, jwt_auth };

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints into the app
    // - /health: liveness check with app name/version
    // - /ready: readiness check with an actual database ping
    let app = router
        .merge(health_router(app_info!()))
        .merge(api::ready_router(state.clone()));

    info!("Starting taskforge API with graceful shutdown (30s timeout)");

    // State moves into the cleanup future below, so take the listen address first
    let server_config = state.config.server.clone();

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connection");
            match state.db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Taskforge API shutdown complete");
    Ok(())
}
