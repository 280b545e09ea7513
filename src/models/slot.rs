//! Placed time intervals.
//!
//! A slot realizes one appointment at one concrete time. The week repeats,
//! so two slots conflict when they share a weekday and their clock-time
//! ranges intersect, whatever their calendar dates.

use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{Appointment, AppointmentId};

/// An appointment placed at a concrete time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Start time (inclusive).
    pub start: NaiveDateTime,
    /// End time (exclusive).
    pub end: NaiveDateTime,
    /// Preference weight. Fixed appointments use `f64::INFINITY`, written
    /// as `null` when serialized.
    #[serde(with = "unbounded_weight")]
    pub weight: f64,
    /// Appointment realized by this slot.
    pub appointment: Arc<Appointment>,
}

impl Slot {
    /// Creates a slot with weight 1.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, appointment: Arc<Appointment>) -> Self {
        Self {
            start,
            end,
            weight: 1.0,
            appointment,
        }
    }

    /// The definite slot of a fixed appointment; `None` for other kinds.
    pub fn from_fixed(appointment: Arc<Appointment>) -> Option<Self> {
        let (start, end) = match appointment.as_ref() {
            Appointment::Fixed(f) => (f.start, f.end),
            _ => return None,
        };
        Some(Self {
            start,
            end,
            weight: f64::INFINITY,
            appointment,
        })
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[inline]
    pub fn appointment_id(&self) -> AppointmentId {
        self.appointment.id()
    }

    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Day bucket index, Sunday = 0.
    #[inline]
    pub fn weekday_index(&self) -> usize {
        self.start.weekday().num_days_from_sunday() as usize
    }

    /// Half-open `[start, end)` in minutes since midnight of the start day.
    pub fn day_minutes(&self) -> (i64, i64) {
        let start = i64::from(self.start.time().num_seconds_from_midnight() / 60);
        (start, start + self.duration_minutes())
    }

    /// Whether two slots collide within the repeating week.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.weekday_index() != other.weekday_index() {
            return false;
        }
        let (a_start, a_end) = self.day_minutes();
        let (b_start, b_end) = other.day_minutes();
        a_start < b_end && b_start < a_end
    }

    /// Whether `time` falls inside this slot's clock-time range.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        let minute = i64::from(time.num_seconds_from_midnight() / 60);
        let (start, end) = self.day_minutes();
        minute >= start && minute < end
    }

    /// Start as fractional hours, e.g. 14:30 → 14.5.
    pub fn start_hour(&self) -> f64 {
        f64::from(self.start.hour()) + f64::from(self.start.minute()) / 60.0
    }
}

/// Serde adapter for slot weights: non-finite weights map to `None`.
mod unbounded_weight {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(weight: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if weight.is_finite() {
            serializer.serialize_some(weight)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
