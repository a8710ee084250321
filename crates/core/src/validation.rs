//! # Appointment Validation
//!
//! Format and business-rule checks applied before an appointment reaches
//! storage. Checks run in a fixed order and the first failure wins:
//!
//! 1. required fields (`date`, `start_time`)
//! 2. date format (`YYYY-MM-DD`)
//! 3. time format (`HH:MM`), then business hours
//!
//! The conflict check needs existing appointments and therefore lives with the
//! repository; [`within_conflict_window`] is the rule it applies.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use eyre::{eyre, Result};
use regex::Regex;

use crate::errors::{AppointmentError, AppointmentResult};
use crate::models::appointment::{
    AppointmentChanges, CreateAppointmentRequest, NewAppointment, UpdateAppointmentRequest,
};

/// Two appointments on the same date conflict when their start times are
/// strictly less than this many seconds apart.
pub const CONFLICT_WINDOW_SECONDS: i64 = 60 * 60;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").unwrap());

/// Inclusive window of accepted appointment start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl BusinessHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if end < start {
            return Err(eyre!(
                "Business hours end {} precedes start {}",
                end.format(TIME_FORMAT),
                start.format(TIME_FORMAT)
            ));
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_time(start).map_err(|_| eyre!("Invalid business hours start: {start}"))?;
        let end = parse_time(end).map_err(|_| eyre!("Invalid business hours end: {end}"))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn validate_date(raw: &str) -> AppointmentResult<NaiveDate> {
    if !DATE_PATTERN.is_match(raw) {
        return Err(AppointmentError::DateFormat);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| AppointmentError::DateFormat)
}

/// Parses an `HH:MM` time of day without looking at business hours.
pub fn parse_time(raw: &str) -> AppointmentResult<NaiveTime> {
    if !TIME_PATTERN.is_match(raw) {
        return Err(AppointmentError::TimeFormat);
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| AppointmentError::TimeFormat)
}

/// Returns the `date` and `start_time` of a create request, or every field
/// that is missing or blank.
pub fn validate_required_fields(
    request: &CreateAppointmentRequest,
) -> AppointmentResult<(&str, &str)> {
    let date = non_blank(request.date.as_deref());
    let start_time = non_blank(request.start_time.as_deref());

    let mut empty_fields = Vec::new();
    if date.is_none() {
        empty_fields.push("Date field is empty.".to_string());
    }
    if start_time.is_none() {
        empty_fields.push("Start_time field is empty.".to_string());
    }

    match (date, start_time) {
        (Some(date), Some(start_time)) => Ok((date, start_time)),
        _ => Err(AppointmentError::MissingFields(empty_fields)),
    }
}

/// Whether `candidate` falls inside the conflict window around `existing`.
/// Start times exactly one hour apart do not conflict.
pub fn within_conflict_window(candidate: NaiveTime, existing: NaiveTime) -> bool {
    (candidate - existing).num_seconds().abs() < CONFLICT_WINDOW_SECONDS
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Blank addresses are stored as `NULL`.
fn normalize_email(email: Option<&str>) -> Option<String> {
    non_blank(email).map(str::to_string)
}

/// Validator bound to the configured business hours.
#[derive(Debug, Clone)]
pub struct AppointmentValidator {
    hours: BusinessHours,
}

impl AppointmentValidator {
    pub fn new(hours: BusinessHours) -> Self {
        Self { hours }
    }

    /// Parses an `HH:MM` time and checks it against business hours.
    /// A malformed time is always a format error, never a range error.
    pub fn validate_time(&self, raw: &str) -> AppointmentResult<NaiveTime> {
        let time = parse_time(raw)?;
        if !self.hours.contains(time) {
            return Err(AppointmentError::TimeRange {
                start: self.hours.start.format(TIME_FORMAT).to_string(),
                end: self.hours.end.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(time)
    }

    pub fn validate_new(
        &self,
        request: &CreateAppointmentRequest,
    ) -> AppointmentResult<NewAppointment> {
        let (date, start_time) = validate_required_fields(request)?;
        let date = validate_date(date)?;
        let start_time = self.validate_time(start_time)?;
        let email = normalize_email(request.email.as_deref());

        Ok(NewAppointment {
            date,
            start_time,
            email,
        })
    }

    pub fn validate_changes(
        &self,
        request: &UpdateAppointmentRequest,
    ) -> AppointmentResult<AppointmentChanges> {
        let changes = AppointmentChanges {
            date: request.date.as_deref().map(validate_date).transpose()?,
            start_time: request
                .start_time
                .as_deref()
                .map(|t| self.validate_time(t))
                .transpose()?,
            email: request
                .email
                .as_ref()
                .map(|email| normalize_email(email.as_deref())),
        };

        if changes.is_empty() {
            return Err(AppointmentError::InvalidBody(
                "No updatable fields provided".to_string(),
            ));
        }
        Ok(changes)
    }
}
