//! Test doubles for [`AppointmentRepository`](crate::repositories::AppointmentRepository).

pub mod memory;
pub mod repositories;
