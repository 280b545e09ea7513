//! Weekly planning domain models.
//!
//! Provides the data types for the planning input (appointments and
//! business hours) and the planning output (slots bucketed into a week).
//!
//! # Lifecycle
//!
//! | Type | Owned by | Lifetime |
//! |------|----------|----------|
//! | Appointment | caller (shared via `Arc` once planning starts) | whole run |
//! | Slot | one candidate week | one generation |
//! | WeekCalendar | one GA individual | one generation |

mod appointment;
mod hours;
mod slot;
mod week;

pub use appointment::{
    Appointment, AppointmentId, ConstrainedAppointment, ConstrainedWindow, FixedAppointment,
    FlexibleAppointment, Preference,
};
pub use hours::BusinessHours;
pub use slot::Slot;
pub use week::{WeekCalendar, DAYS_PER_WEEK};
