//! Application initialization: tracing, database, services, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use axum::Router;
use wayfarer_core::Config;

use crate::state::AppState;

/// Install the global tracing subscriber. `RUST_LOG` controls filtering;
/// defaults to info for this crate's workspace.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wayfarer_api=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

/// Build the full application: pool, migrations, services, and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let pool = database::setup_database(&config).await?;
    let state = services::setup_services(config, pool).await?;
    let router = routes::setup_routes(state.clone())?;
    Ok((state, router))
}
