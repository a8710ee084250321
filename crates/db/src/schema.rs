use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id BIGSERIAL PRIMARY KEY,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            email VARCHAR(255) NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Conflict lookups and listing both filter or sort by date
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
