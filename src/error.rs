use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schedule {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email api rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill all fields!")]
    MissingFields,

    #[error("{field} must be a date formatted YYYY-MM-DD, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("hour must be between 00 and 23, got {0}")]
    InvalidHour(u8),

    #[error("minute must be between 00 and 59, got {0}")]
    InvalidMinute(u8),

    #[error("Invalid email")]
    InvalidEmail,
}

/// Maps a store failure onto the `(StatusCode, String)` rejection handlers return.
pub fn store_rejection(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Reminder not found".into()),
        StoreError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

impl From<ValidationError> for (StatusCode, String) {
    fn from(e: ValidationError) -> Self {
        (StatusCode::BAD_REQUEST, e.to_string())
    }
}
