use axum::Router;
use tokio::net::TcpListener;

use wayfarer_core::Config;

/// Bind and serve until shutdown.
pub async fn start_server(config: &Config, router: Router) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        environment = %config.environment(),
        "Wayfarer API listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown signal handler");
    }
    tracing::info!("Shutdown signal received");
}
