//! # Error Handling Middleware
//!
//! Maps [`AppointmentError`] values to HTTP status codes and JSON bodies of
//! the form `{"message": ...}`. Two variants carry extra data: missing fields
//! add an `empty_fields` list, and method errors set the `Allow` header.

use appointments_core::errors::AppointmentError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on both
/// `AppointmentResult` and `eyre::Result` values.
#[derive(Debug)]
pub struct AppError(pub AppointmentError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppointmentError::MissingFields(_) => StatusCode::CONFLICT,
            AppointmentError::DateFormat => StatusCode::BAD_REQUEST,
            AppointmentError::TimeFormat => StatusCode::BAD_REQUEST,
            AppointmentError::TimeRange { .. } => StatusCode::BAD_REQUEST,
            AppointmentError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppointmentError::Conflict => StatusCode::CONFLICT,
            AppointmentError::NotFound(_) => StatusCode::NOT_FOUND,
            AppointmentError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppointmentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self.0 {
            AppointmentError::MissingFields(fields) => (
                status,
                Json(json!({ "message": "Empty fields.", "empty_fields": fields })),
            )
                .into_response(),
            AppointmentError::MethodNotAllowed(allow) => {
                let message = AppointmentError::MethodNotAllowed(allow).to_string();
                (status, [(header::ALLOW, allow)], Json(json!({ "message": message })))
                    .into_response()
            }
            AppointmentError::Database(err) => {
                // Storage details stay in the logs
                tracing::error!("Database error: {:?}", err);
                (status, Json(json!({ "message": "Internal server error" }))).into_response()
            }
            other => (status, Json(json!({ "message": other.to_string() }))).into_response(),
        }
    }
}

/// Automatic conversion from AppointmentError to AppError
impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Repository calls return `eyre::Result`; their failures surface as
/// storage errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AppointmentError::Database(err))
    }
}
