use appointments_core::models::appointment::{Appointment, AppointmentChanges, NewAppointment};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mockall::mock;

use crate::repositories::AppointmentRepository;

// Mock repository for testing
mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentRepository for AppointmentRepo {
        async fn list(&self) -> eyre::Result<Vec<Appointment>>;

        async fn get(&self, id: i64) -> eyre::Result<Option<Appointment>>;

        async fn create(&self, appointment: NewAppointment) -> eyre::Result<i64>;

        async fn update(&self, id: i64, changes: AppointmentChanges) -> eyre::Result<u64>;

        async fn delete(&self, id: i64) -> eyre::Result<u64>;

        async fn find_conflicts(
            &self,
            date: NaiveDate,
            start_time: NaiveTime,
            exclude_id: Option<i64>,
        ) -> eyre::Result<Vec<Appointment>>;
    }
}
