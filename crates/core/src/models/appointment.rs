use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    pub email: Option<String>,
}

/// Raw body of `POST /appointment`.
///
/// Every field is optional at this stage so that absent and empty values can
/// be reported together by the validator instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub email: Option<String>,
}

/// Raw body of `PATCH /appointment/{id}`.
///
/// The field list doubles as the allow-list of updatable columns: any other key
/// is rejected when the body is parsed.
///
/// `email` tells an absent key (`None`) apart from an explicit `null`
/// (`Some(None)`), which clears the stored address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub email: Option<String>,
}

/// A validated partial update. `None` leaves the column untouched;
/// `email: Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub email: Option<Option<String>>,
}

impl AppointmentChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.start_time.is_none() && self.email.is_none()
    }

    /// Whether applying these changes can move the appointment to another slot.
    pub fn moves_slot(&self) -> bool {
        self.date.is_some() || self.start_time.is_some()
    }

    /// The `(date, start_time)` the appointment will occupy once these changes
    /// are applied to `current`.
    pub fn resulting_slot(&self, current: &Appointment) -> (NaiveDate, NaiveTime) {
        (
            self.date.unwrap_or(current.date),
            self.start_time.unwrap_or(current.start_time),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentResponse {
    pub message: String,
    pub id: i64,
}

impl CreateAppointmentResponse {
    pub fn new(id: i64) -> Self {
        Self {
            message: "Appointment created successfully".to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAppointmentResponse {
    pub message: String,
    pub data: Appointment,
}

impl GetAppointmentResponse {
    pub fn new(data: Appointment) -> Self {
        Self {
            message: "Appointment found successfully".to_string(),
            data,
        }
    }
}

/// Response of the mutating endpoints that report an affected-row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowsAffectedResponse {
    pub message: String,
    pub rows: u64,
}

impl RowsAffectedResponse {
    pub fn updated(rows: u64) -> Self {
        Self {
            message: "Appointment updated successfully".to_string(),
            rows,
        }
    }

    pub fn deleted(rows: u64) -> Self {
        Self {
            message: "Appointment deleted successfully".to_string(),
            rows,
        }
    }
}

/// Only called when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

/// `start_time` travels as `HH:MM` on the wire.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
