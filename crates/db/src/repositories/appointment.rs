use crate::DbPool;
use crate::models::DbAppointment;
use appointments_core::models::appointment::{Appointment, AppointmentChanges, NewAppointment};
use appointments_core::validation::CONFLICT_WINDOW_SECONDS;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use sqlx::{Pool, Postgres, QueryBuilder};

pub async fn list_appointments(pool: &Pool<Postgres>) -> Result<Vec<DbAppointment>> {
    tracing::debug!("Listing appointments");

    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, start_time, email
        FROM appointments
        ORDER BY date DESC, start_time ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Getting appointment by id: {}", id);

    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, start_time, email
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    if appointment.is_none() {
        tracing::debug!("Appointment not found: id={}", id);
    }

    Ok(appointment)
}

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &NewAppointment,
) -> Result<i64> {
    tracing::debug!(
        "Creating appointment: date={}, start_time={}, has_email={}",
        appointment.date,
        appointment.start_time,
        appointment.email.is_some()
    );

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO appointments (date, start_time, email)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(appointment.date)
    .bind(appointment.start_time)
    .bind(appointment.email.as_deref())
    .fetch_one(pool)
    .await?;

    tracing::debug!("Appointment created successfully: id={}", id);
    Ok(id)
}

/// Applies the present fields of `changes` and returns the affected-row count.
///
/// Column names are fixed literals; user input only ever reaches the query as
/// bound values.
pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: i64,
    changes: &AppointmentChanges,
) -> Result<u64> {
    if changes.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE appointments SET ");
    let mut assignments = builder.separated(", ");
    if let Some(date) = changes.date {
        assignments.push("date = ").push_bind_unseparated(date);
    }
    if let Some(start_time) = changes.start_time {
        assignments.push("start_time = ").push_bind_unseparated(start_time);
    }
    if let Some(email) = &changes.email {
        // `None` binds as NULL and clears the address.
        assignments.push("email = ").push_bind_unseparated(email.clone());
    }
    builder.push(" WHERE id = ").push_bind(id);

    let result = builder.build().execute(pool).await?;

    tracing::debug!("Updated appointment id={}, rows={}", id, result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    tracing::debug!("Deleted appointment id={}, rows={}", id, result.rows_affected());
    Ok(result.rows_affected())
}

/// Appointments on `date` whose start time is strictly less than the conflict
/// window away from `start_time`, optionally ignoring one appointment.
///
/// `TIME - TIME` yields an interval without wrapping at midnight, so the
/// window does not leak across the date boundary.
pub async fn find_conflicting_appointments(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    start_time: NaiveTime,
    exclude_id: Option<i64>,
) -> Result<Vec<DbAppointment>> {
    let conflicts = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, start_time, email
        FROM appointments
        WHERE date = $1
          AND ABS(EXTRACT(EPOCH FROM (start_time - $2::TIME))) < $3
          AND ($4::BIGINT IS NULL OR id <> $4)
        ORDER BY start_time ASC
        "#,
    )
    .bind(date)
    .bind(start_time)
    .bind(CONFLICT_WINDOW_SECONDS)
    .bind(exclude_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!(
        "Conflict lookup: date={}, start_time={}, conflicts={}",
        date,
        start_time,
        conflicts.len()
    );
    Ok(conflicts)
}

/// Storage operations needed by the HTTP layer.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// All appointments, most recent date first.
    async fn list(&self) -> Result<Vec<Appointment>>;

    async fn get(&self, id: i64) -> Result<Option<Appointment>>;

    /// Inserts the appointment and returns its generated id.
    async fn create(&self, appointment: NewAppointment) -> Result<i64>;

    async fn update(&self, id: i64, changes: AppointmentChanges) -> Result<u64>;

    async fn delete(&self, id: i64) -> Result<u64>;

    async fn find_conflicts(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_id: Option<i64>,
    ) -> Result<Vec<Appointment>>;
}

/// [`AppointmentRepository`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgAppointmentRepository {
    pool: DbPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn list(&self) -> Result<Vec<Appointment>> {
        let rows = list_appointments(&self.pool).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Appointment>> {
        let row = get_appointment_by_id(&self.pool, id).await?;
        Ok(row.map(Appointment::from))
    }

    async fn create(&self, appointment: NewAppointment) -> Result<i64> {
        create_appointment(&self.pool, &appointment).await
    }

    async fn update(&self, id: i64, changes: AppointmentChanges) -> Result<u64> {
        update_appointment(&self.pool, id, &changes).await
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        delete_appointment(&self.pool, id).await
    }

    async fn find_conflicts(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_id: Option<i64>,
    ) -> Result<Vec<Appointment>> {
        let rows = find_conflicting_appointments(&self.pool, date, start_time, exclude_id).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }
}
