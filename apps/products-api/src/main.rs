//! Products API - REST server

use axum::Router;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::InMemoryProductRepository;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // The catalog lives for the whole process and starts empty
    let state = AppState::new(config, InMemoryProductRepository::new());
    let app = build_app(&state)?;

    info!(
        "Starting {} v{} on {}",
        state.config.app.name,
        state.config.app.version,
        state.config.server.address()
    );

    create_production_app(app, &state.config.server, async {
        info!("In-memory catalog dropped");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}

/// Full application router: documented API, liveness and readiness.
fn build_app(state: &AppState) -> eyre::Result<Router> {
    let router = axum_helpers::create_router::<openapi::ApiDoc>(
        api::routes(state),
        &state.config.cors,
        &state.config.environment,
    )?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone())))
}
