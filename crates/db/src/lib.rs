//! PostgreSQL storage for appointments: the connection pool, schema bootstrap
//! and the appointment repository, plus test doubles under [`mock`].

pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use eyre::{Result, WrapErr};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

/// Upper bound on open connections shared by all request handlers.
pub const MAX_CONNECTIONS: u32 = 5;

pub type DbPool = Pool<Postgres>;

/// Opens the appointment store. Failure here is a storage connection error and
/// aborts startup.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to the appointments database")?;

    tracing::info!("Appointment store ready (max_connections={})", MAX_CONNECTIONS);
    Ok(pool)
}
