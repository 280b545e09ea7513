//! Week calendar model.
//!
//! Seven day buckets of [`Slot`]s, Sunday (0) to Saturday (6). A calendar
//! is built once from a flat slot list and then only queried; every
//! aggregate is computed on demand.
//!
//! # Invariant
//! Within one bucket no two slots should overlap. Placement guarantees
//! this; the calendar itself does not enforce it (see [`WeekCalendar::conflicts`]).

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Appointment, AppointmentId, Slot};

/// Number of day buckets.
pub const DAYS_PER_WEEK: usize = 7;

const SUNDAY: usize = 0;
const SATURDAY: usize = 6;

/// One candidate week: slots bucketed by weekday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekCalendar {
    days: [Vec<Slot>; DAYS_PER_WEEK],
}

impl WeekCalendar {
    /// Creates an empty week.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets slots by the weekday of their start.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut week = Self::default();
        for slot in slots {
            week.days[slot.weekday_index()].push(slot);
        }
        week
    }

    /// Slots of one day (Sunday = 0). Out-of-range indices yield an empty slice.
    pub fn day(&self, index: usize) -> &[Slot] {
        self.days.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All day buckets.
    pub fn days(&self) -> &[Vec<Slot>; DAYS_PER_WEEK] {
        &self.days
    }

    /// Iterates every slot, Sunday first.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.days.iter().flatten()
    }

    /// Consumes the week into a flat slot list.
    pub fn into_slots(self) -> Vec<Slot> {
        self.days.into_iter().flatten().collect()
    }

    /// Total number of placed slots.
    pub fn slot_count(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// Slots per day, each counted with one extra free gap.
    pub fn slots_per_day(&self) -> [usize; DAYS_PER_WEEK] {
        std::array::from_fn(|d| self.days[d].len() + 1)
    }

    /// Occupied minutes per day.
    pub fn busy_minutes_per_day(&self) -> [i64; DAYS_PER_WEEK] {
        std::array::from_fn(|d| busy_minutes(&self.days[d]))
    }

    /// Occupied minutes on Saturday and Sunday combined.
    pub fn weekend_minutes(&self) -> i64 {
        busy_minutes(&self.days[SATURDAY]) + busy_minutes(&self.days[SUNDAY])
    }

    /// Appointment occupying `at`'s clock-time on `at`'s weekday.
    pub fn find_at(&self, at: NaiveDateTime) -> Option<&Appointment> {
        let day = at.weekday().num_days_from_sunday() as usize;
        self.days[day]
            .iter()
            .find(|s| s.contains_time(at.time()))
            .map(|s| s.appointment.as_ref())
    }

    /// Slots realizing the given appointment.
    pub fn slots_for(&self, id: AppointmentId) -> Vec<&Slot> {
        self.slots().filter(|s| s.appointment_id() == id).collect()
    }

    /// Slots descending from the given caller appointment (split parts included).
    pub fn slots_for_origin(&self, origin: AppointmentId) -> Vec<&Slot> {
        self.slots()
            .filter(|s| s.appointment.origin_id() == origin)
            .collect()
    }

    /// Pairs of overlapping slots, per day.
    pub fn conflicts(&self) -> Vec<(&Slot, &Slot)> {
        let mut pairs = Vec::new();
        for day in &self.days {
            for (i, a) in day.iter().enumerate() {
                for b in &day[i + 1..] {
                    if a.overlaps(b) {
                        pairs.push((a, b));
                    }
                }
            }
        }
        pairs
    }
}

fn busy_minutes(slots: &[Slot]) -> i64 {
    slots.iter().map(Slot::duration_minutes).sum()
}
