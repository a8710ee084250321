//! Appointments server: loads configuration, makes sure the `appointments`
//! table exists, then serves the HTTP API until the process is stopped.

use appointments_api::config::ApiConfig;
use appointments_db::{create_pool, schema::initialize_database, DbPool};
use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;

/// Connects to storage and bootstraps the schema before any request is served.
async fn prepare_store(config: &ApiConfig) -> Result<DbPool> {
    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool)
        .await
        .wrap_err("Failed to create the appointments schema")?;
    Ok(db_pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // A missing .env file is fine; the process environment still applies.
    dotenv().ok();

    let config = ApiConfig::from_env().wrap_err("Invalid appointments configuration")?;
    let db_pool = prepare_store(&config).await?;

    appointments_api::start_server(config, db_pool)
        .await
        .wrap_err("Appointments server stopped with an error")
}
