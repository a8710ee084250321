use appointments_core::models::appointment::Appointment;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub email: Option<String>,
}

impl From<DbAppointment> for Appointment {
    fn from(row: DbAppointment) -> Self {
        Appointment {
            id: row.id,
            date: row.date,
            start_time: row.start_time,
            email: row.email,
        }
    }
}
