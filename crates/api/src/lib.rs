//! # Appointments API
//!
//! HTTP front end for the appointment store. A single resource,
//! `/appointment`, supports listing, creation, lookup, partial update and
//! deletion. New appointments are validated against the configured business
//! hours and rejected when they fall within an hour of another appointment on
//! the same date.
//!
//! ## Architecture
//!
//! - **Routes**: map `(method, path)` pairs to handlers, including the
//!   405 responses for unsupported methods
//! - **Handlers**: run validation, conflict checks and repository calls
//! - **Middleware**: turns domain errors into JSON responses
//! - **Config**: environment-driven settings
//!
//! Handlers only see the [`AppointmentRepository`] trait, so the router can be
//! driven by the PostgreSQL repository in production and by test doubles in
//! tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Error mapping from domain errors to HTTP responses
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use appointments_core::validation::AppointmentValidator;
use appointments_db::repositories::{AppointmentRepository, PgAppointmentRepository};
use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Appointment storage
    pub repository: Arc<dyn AppointmentRepository>,
    /// Validator bound to the configured business hours
    pub validator: AppointmentValidator,
}

impl ApiState {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        validator: AppointmentValidator,
    ) -> Self {
        Self {
            repository,
            validator,
        }
    }
}

/// Builds the application router with every route and the request tracing
/// layer attached.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Appointment endpoints
        .merge(routes::appointment::routes())
        // Anything else is not a known resource
        .fallback(handlers::appointment::unknown_endpoint)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, wires the PostgreSQL repository and the
/// validator into the shared state, and serves HTTP until the process exits.
///
/// # Arguments
///
/// * `config` - API configuration including host, port and business hours
/// * `db_pool` - PostgreSQL connection pool for database operations
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(
        Arc::new(PgAppointmentRepository::new(db_pool)),
        AppointmentValidator::new(config.business_hours),
    ));

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect::<Vec<axum::http::HeaderValue>>();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                config.request_timeout,
            )))
            .into_inner(),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Server listening on http://{} (business hours {} to {})",
        addr,
        config.business_hours.start().format("%H:%M"),
        config.business_hours.end().format("%H:%M")
    );
    axum::serve(listener, app).await?;

    Ok(())
}
