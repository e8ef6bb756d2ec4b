pub mod ai_info;
pub mod learning;
pub mod progress;

use ai_info_core::SLOT_COUNT;
use chrono::NaiveDate;
use thiserror::Error;

use crate::response::AppError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => AppError::validation(message),
            ServiceError::NotFound(message) => AppError::not_found(message),
            ServiceError::Sql(source) => {
                tracing::error!(error = %source, "database operation failed");
                AppError::internal(format!("database operation failed: {source}"))
            }
        }
    }
}

/// Accepts `YYYY-MM-DD` only.
pub fn validate_date(date: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ServiceError::Validation(format!("invalid date '{date}', expected YYYY-MM-DD"))
    })
}

/// Parses a slot index given as text. Anything outside `0..SLOT_COUNT` is
/// rejected with the offending value in the message.
pub fn parse_slot_index(raw: &str) -> Result<usize, ServiceError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|index| *index < SLOT_COUNT)
        .ok_or_else(|| {
            ServiceError::Validation(format!(
                "invalid item index '{raw}', must be 0, 1, or 2"
            ))
        })
}
