use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use wayfarer_core::Config;

/// Connect to Postgres and run pending migrations.
pub async fn setup_database(config: &Config) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .connect(config.database_url())
        .await?;

    sqlx::migrate!("../wayfarer-db/migrations").run(&pool).await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database pool initialized"
    );
    Ok(pool)
}
