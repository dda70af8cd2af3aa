//! Error types for recurrence-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid interval: {0} (must be between 1 and {max})", max = i32::MAX)]
    InvalidInterval(i64),

    #[error("Incomplete rule: {0}")]
    IncompleteRule(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("Unknown pattern code: {0}")]
    UnknownPattern(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
