mod api_doc;
mod auth;
mod constants;
mod error;
mod handlers;
mod setup;
mod state;

use wayfarer_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env in development; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    setup::init_tracing();

    let config = Config::from_env()?;

    // Initialize the application (database, services, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
