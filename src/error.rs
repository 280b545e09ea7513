//! Error taxonomy for weekly planning.
//!
//! Capacity errors (no room for a flexible appointment) are fatal to the
//! run that raises them: the caller gets no partial schedule and may retry
//! with different parameters.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used throughout the crate.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors raised while resolving, placing, or evolving a week.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The appointment is longer than the business day.
    #[error("appointment '{name}' needs {minutes} min, business day spans {available} min")]
    ExceedsBusinessDay {
        name: String,
        minutes: i64,
        available: i64,
    },

    /// The deadline leaves no room on the chosen day (or on any day).
    #[error("appointment '{name}' cannot finish before its deadline {deadline}")]
    DeadlineUnreachable {
        name: String,
        deadline: NaiveDateTime,
    },

    /// Rejection sampling ran out of attempts.
    #[error("no free slot for appointment '{name}' after {attempts} attempts")]
    NoFreeSlot { name: String, attempts: usize },

    /// A constrained appointment reached placement without being resolved.
    #[error("constrained appointment '{name}' must be resolved before placement")]
    Unresolved { name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
}

impl ScheduleError {
    /// Whether this error means the week has no room for an appointment.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            ScheduleError::ExceedsBusinessDay { .. }
                | ScheduleError::DeadlineUnreachable { .. }
                | ScheduleError::NoFreeSlot { .. }
        )
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
