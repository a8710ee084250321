//! # Appointment Handlers
//!
//! Create flow: parse body → required fields → date format → time format and
//! business hours → conflict check → insert. The first failing step produces
//! the only response.
//!
//! The conflict check and the insert are separate statements, so two
//! concurrent requests for overlapping slots can both pass the check.

use appointments_core::{
    errors::AppointmentError,
    models::appointment::{
        Appointment, CreateAppointmentRequest, CreateAppointmentResponse, GetAppointmentResponse,
        RowsAffectedResponse, UpdateAppointmentRequest,
    },
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{middleware::error_handling::AppError, ApiState};

/// `Allow` header value for `/appointment`.
pub const COLLECTION_METHODS: &str = "GET, POST";
/// `Allow` header value for `/appointment/{id}`.
pub const ITEM_METHODS: &str = "GET, PATCH, DELETE";

pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.repository.list().await?;
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<GetAppointmentResponse>, AppError> {
    let appointment = find_appointment(&state, &raw_id).await?;
    Ok(Json(GetAppointmentResponse::new(appointment)))
}

pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<CreateAppointmentResponse>, AppError> {
    let payload: CreateAppointmentRequest = parse_body(&body)?;

    let appointment = state.validator.validate_new(&payload).inspect_err(|err| {
        debug!("Rejected appointment: {}", err);
    })?;

    ensure_slot_available(&state, appointment.date, appointment.start_time, None).await?;

    let id = state.repository.create(appointment).await?;
    info!("Appointment created: id={}", id);

    Ok(Json(CreateAppointmentResponse::new(id)))
}

pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<RowsAffectedResponse>, AppError> {
    // Existence is checked before the body is even looked at
    let current = find_appointment(&state, &raw_id).await?;

    let payload: UpdateAppointmentRequest = parse_body(&body)?;
    let changes = state.validator.validate_changes(&payload)?;

    if changes.moves_slot() {
        let (date, start_time) = changes.resulting_slot(&current);
        ensure_slot_available(&state, date, start_time, Some(current.id)).await?;
    }

    let rows = state.repository.update(current.id, changes).await?;
    info!("Appointment updated: id={}, rows={}", current.id, rows);

    Ok(Json(RowsAffectedResponse::updated(rows)))
}

pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<RowsAffectedResponse>, AppError> {
    let id = parse_id(&raw_id)?;

    let rows = state.repository.delete(id).await?;
    if rows == 0 {
        return Err(AppointmentError::NotFound(raw_id).into());
    }
    info!("Appointment deleted: id={}", id);

    Ok(Json(RowsAffectedResponse::deleted(rows)))
}

pub async fn collection_method_not_allowed() -> AppError {
    AppError(AppointmentError::MethodNotAllowed(COLLECTION_METHODS))
}

pub async fn item_method_not_allowed() -> AppError {
    AppError(AppointmentError::MethodNotAllowed(ITEM_METHODS))
}

pub async fn unknown_endpoint() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Unknown endpoint. 'appointment' is the only resource accepted"
        })),
    )
}

/// Fails with `Conflict` if another appointment on `date` starts within the
/// conflict window of `start_time`.
async fn ensure_slot_available(
    state: &ApiState,
    date: NaiveDate,
    start_time: NaiveTime,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let conflicts = state
        .repository
        .find_conflicts(date, start_time, exclude_id)
        .await?;

    if !conflicts.is_empty() {
        warn!(
            "Conflict detected for {} {} - {} overlapping appointments",
            date,
            start_time.format("%H:%M"),
            conflicts.len()
        );
        return Err(AppointmentError::Conflict.into());
    }
    Ok(())
}

async fn find_appointment(state: &ApiState, raw_id: &str) -> Result<Appointment, AppError> {
    let id = parse_id(raw_id)?;
    state
        .repository
        .get(id)
        .await?
        .ok_or_else(|| AppointmentError::NotFound(raw_id.to_string()).into())
}

/// Path ids that are not integers cannot name an appointment.
fn parse_id(raw_id: &str) -> Result<i64, AppError> {
    raw_id
        .parse()
        .map_err(|_| AppointmentError::NotFound(raw_id.to_string()).into())
}

/// The body is decoded as JSON whatever the declared content type.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|err| AppointmentError::InvalidBody(err.to_string()).into())
}
