use appointments_api::config::database_url_from_env;
use appointments_db::{create_pool, schema::initialize_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    // Load environment variables
    dotenv().ok();

    let database_url = database_url_from_env()?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}
