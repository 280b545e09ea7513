//! Input validation for weekly planning.
//!
//! Checks structural integrity of appointments before scheduling. Detects:
//! - Duplicate IDs
//! - Inverted intervals (fixed appointments and constrained windows)
//! - Non-positive flexible durations
//! - Constrained appointments without windows

use std::collections::HashSet;

use crate::models::Appointment;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two appointments share the same ID.
    DuplicateId,
    /// An interval ends at or before its start.
    InvertedInterval,
    /// A flexible appointment has zero or negative duration.
    NonPositiveDuration,
    /// A constrained appointment has no candidate windows.
    EmptyWindows,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the appointments of a planning request.
///
/// Checks:
/// 1. No duplicate appointment IDs
/// 2. Fixed appointments end after they start
/// 3. Flexible appointments have a positive duration
/// 4. Constrained appointments have at least one window
/// 5. Every constrained window ends after it starts
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_appointments(appointments: &[Appointment]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for appointment in appointments {
        if !ids.insert(appointment.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate appointment ID: {}", appointment.id()),
            ));
        }

        match appointment {
            Appointment::Fixed(fixed) => {
                if fixed.end <= fixed.start {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvertedInterval,
                        format!(
                            "Fixed appointment '{}' ends at {} before starting at {}",
                            fixed.name, fixed.end, fixed.start
                        ),
                    ));
                }
            }
            Appointment::Flexible(flex) => {
                if flex.duration_minutes <= 0 {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::NonPositiveDuration,
                        format!(
                            "Flexible appointment '{}' has duration {} min",
                            flex.name, flex.duration_minutes
                        ),
                    ));
                }
            }
            Appointment::Constrained(c) => {
                if c.windows.is_empty() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EmptyWindows,
                        format!("Constrained appointment '{}' has no windows", c.name),
                    ));
                }
                for window in c.windows.iter().filter(|w| w.end <= w.start) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvertedInterval,
                        format!(
                            "Constrained appointment '{}' has window {} - {}",
                            c.name, window.start, window.end
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
