use std::collections::BTreeMap;

use appointments_core::models::appointment::{Appointment, AppointmentChanges, NewAppointment};
use appointments_core::validation::within_conflict_window;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use tokio::sync::RwLock;

use crate::repositories::AppointmentRepository;

/// Process-local [`AppointmentRepository`] with the same ordering and conflict
/// rules as the PostgreSQL implementation. Ids start at 1.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Appointment>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn list(&self) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state.rows.values().cloned().collect();
        appointments.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(appointments)
    }

    async fn get(&self, id: i64) -> Result<Option<Appointment>> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, appointment: NewAppointment) -> Result<i64> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state.rows.insert(
            id,
            Appointment {
                id,
                date: appointment.date,
                start_time: appointment.start_time,
                email: appointment.email,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, changes: AppointmentChanges) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(date) = changes.date {
            row.date = date;
        }
        if let Some(start_time) = changes.start_time {
            row.start_time = start_time;
        }
        if let Some(email) = changes.email {
            row.email = email;
        }
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let removed = self.state.write().await.rows.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn find_conflicts(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_id: Option<i64>,
    ) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut conflicts: Vec<Appointment> = state
            .rows
            .values()
            .filter(|a| Some(a.id) != exclude_id)
            .filter(|a| a.date == date && within_conflict_window(start_time, a.start_time))
            .cloned()
            .collect();
        conflicts.sort_by_key(|a| a.start_time);
        Ok(conflicts)
    }
}
