use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppointmentError {
    /// Required request fields that were absent or empty, one message per field.
    #[error("Empty fields.")]
    MissingFields(Vec<String>),

    #[error("Incorrect date format. The correct format is 'YYYY-MM-DD'")]
    DateFormat,

    #[error("Incorrect time format. The correct format is 'HH:MM'")]
    TimeFormat,

    #[error("The time must be within the accepted hours. From {start} to {end}")]
    TimeRange { start: String, end: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("This appointment conflicts with an existing appointment.")]
    Conflict,

    #[error("Appointment with ID {0} not found")]
    NotFound(String),

    /// Carries the value of the `Allow` header for the requested path.
    #[error("Method not allowed. Allowed methods: {0}")]
    MethodNotAllowed(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),
}

pub type AppointmentResult<T> = Result<T, AppointmentError>;
