//! # API Configuration Module
//!
//! This module handles loading configuration for the appointments API server
//! from environment variables, with defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string. When unset it is built from
//!   `DB_HOST`, `DB_PORT` (default 5432), `DB_NAME`, `DB_USER` and `DB_PASS`
//! - `START_TIME` / `END_TIME`: Business hours as `HH:MM` (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)

use appointments_core::validation::BusinessHours;
use eyre::{eyre, Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the appointments API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use appointments_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Accepted window for appointment start times
    pub business_hours: BusinessHours,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from the process environment
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - Neither `DATABASE_URL` nor the `DB_*` variables are set
    /// - `START_TIME` or `END_TIME` is missing, malformed, or inverted
    /// - The `API_PORT` value cannot be parsed as a u16
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new ApiConfig from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = resolve_database_url(&lookup)?;

        // Business hours
        let start = lookup("START_TIME")
            .ok_or_else(|| eyre!("START_TIME environment variable must be set"))?;
        let end =
            lookup("END_TIME").ok_or_else(|| eyre!("END_TIME environment variable must be set"))?;
        let business_hours =
            BusinessHours::parse(&start, &end).wrap_err("Invalid START_TIME/END_TIME values")?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            database_url,
            business_hours,
            log_level,
            cors_origins,
            request_timeout,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolves the PostgreSQL connection string from the process environment
/// without requiring the rest of the API settings.
pub fn database_url_from_env() -> Result<String> {
    resolve_database_url(&|key: &str| env::var(key).ok())
}

fn resolve_database_url<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let required = |key: &str| {
        lookup(key).ok_or_else(|| eyre!("DATABASE_URL or {key} environment variable must be set"))
    };

    let host = required("DB_HOST")?;
    let name = required("DB_NAME")?;
    let user = required("DB_USER")?;
    let pass = lookup("DB_PASS").unwrap_or_default();
    let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());

    Ok(format!("postgres://{user}:{pass}@{host}:{port}/{name}"))
}
