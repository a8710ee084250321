pub mod appointment;

pub use appointment::{AppointmentRepository, PgAppointmentRepository};
