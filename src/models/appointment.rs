//! Appointment models.
//!
//! Three kinds of appointment share one identifier space:
//!
//! - [`FixedAppointment`]: absolute start/end, never moved.
//! - [`FlexibleAppointment`]: a duration the planner may put anywhere
//!   within business hours (optionally before a deadline, optionally split).
//! - [`ConstrainedAppointment`]: a set of recurring weekly candidate
//!   windows of which exactly one is chosen.
//!
//! Constrained appointments are turned into fixed ones by the
//! [`resolver`](crate::resolver) before the week is evolved.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique appointment identifier.
pub type AppointmentId = Uuid;

/// Preferred part of the day. Informational only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Preference {
    #[default]
    Unset,
    Morning,
    Afternoon,
    Night,
}

/// A weekly window resolved to its next absolute occurrence.
///
/// Used both as a candidate of a [`ConstrainedAppointment`] and as the
/// deadline of a [`FlexibleAppointment`] (whose `start` is the bound).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstrainedWindow {
    /// Day of week this window recurs on.
    pub weekday: Weekday,
    /// Absolute start of the next occurrence.
    pub start: NaiveDateTime,
    /// Absolute end of the next occurrence.
    pub end: NaiveDateTime,
    /// Weight of this candidate (higher = preferred).
    pub priority: i64,
}

impl ConstrainedWindow {
    /// Resolves a weekly window to its next occurrence relative to `now`.
    ///
    /// If this week's occurrence already started, the window rolls forward
    /// by seven days. An end clock-time at or before the start clock-time
    /// ends on the following day.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime, Weekday};
    /// use u_weekplan::models::ConstrainedWindow;
    ///
    /// // Wednesday noon
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(12, 0, 0).unwrap();
    /// let w = ConstrainedWindow::next_occurrence(
    ///     Weekday::Mon,
    ///     NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
    ///     NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
    ///     10,
    ///     now,
    /// );
    /// assert_eq!(w.start.date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    /// ```
    pub fn next_occurrence(
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        priority: i64,
        now: NaiveDateTime,
    ) -> Self {
        let ahead = (weekday.num_days_from_sunday() + 7 - now.weekday().num_days_from_sunday()) % 7;
        let mut date = now.date() + Duration::days(i64::from(ahead));
        if date.and_time(start_time) < now {
            date += Duration::days(7);
        }

        let start = date.and_time(start_time);
        let mut end = date.and_time(end_time);
        if end <= start {
            end += Duration::days(1);
        }

        Self {
            weekday,
            start,
            end,
            priority,
        }
    }

    /// Creates a window from absolute times; the weekday follows `start`.
    pub fn at(start: NaiveDateTime, end: NaiveDateTime, priority: i64) -> Self {
        Self {
            weekday: start.weekday(),
            start,
            end,
            priority,
        }
    }

    /// Window length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two windows overlap in absolute time (half-open).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An appointment with definite start and end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixedAppointment {
    pub id: AppointmentId,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl FixedAppointment {
    /// Creates a fixed appointment with a fresh identifier.
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start,
            end,
        }
    }

    /// Replaces the identifier.
    pub fn with_id(mut self, id: AppointmentId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// An appointment the planner places freely within business hours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlexibleAppointment {
    pub id: AppointmentId,
    pub name: String,
    /// Length in whole minutes.
    pub duration_minutes: i64,
    /// Scheduling priority (higher = more important).
    pub priority: i32,
    pub preference: Preference,
    /// Must end at or before `deadline.start`.
    pub deadline: Option<ConstrainedWindow>,
    /// Whether mutation may split this appointment into contiguous parts.
    pub allow_splitting: bool,
    /// Appointment this one was split from. `None` for caller input.
    pub origin: Option<AppointmentId>,
}

impl FlexibleAppointment {
    /// Creates a flexible appointment with default priority and no deadline.
    pub fn new(name: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration_minutes,
            priority: 1,
            preference: Preference::Unset,
            deadline: None,
            allow_splitting: false,
            origin: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    /// Sets the deadline window; the appointment must end by its start.
    pub fn with_deadline(mut self, deadline: ConstrainedWindow) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_splitting(mut self, allow: bool) -> Self {
        self.allow_splitting = allow;
        self
    }

    /// Latest allowed end time, if any.
    #[inline]
    pub fn deadline_bound(&self) -> Option<NaiveDateTime> {
        self.deadline.as_ref().map(|d| d.start)
    }

    /// Identifier of the caller-supplied appointment this one descends from.
    #[inline]
    pub fn origin_id(&self) -> AppointmentId {
        self.origin.unwrap_or(self.id)
    }

    /// Creates part `part` of `parts` after a split.
    ///
    /// The child keeps priority, preference, deadline and splitting
    /// permission, and records the parent's origin.
    pub fn split_part(
        &self,
        id: AppointmentId,
        duration_minutes: i64,
        part: usize,
        parts: usize,
    ) -> Self {
        Self {
            id,
            name: format!("{} ({}/{})", self.name, part, parts),
            duration_minutes,
            priority: self.priority,
            preference: self.preference,
            deadline: self.deadline.clone(),
            allow_splitting: self.allow_splitting,
            origin: Some(self.origin_id()),
        }
    }
}

/// An appointment with recurring weekly candidate windows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstrainedAppointment {
    pub id: AppointmentId,
    pub name: String,
    /// Candidate windows in caller order.
    pub windows: Vec<ConstrainedWindow>,
    pub allow_splitting: bool,
}

impl ConstrainedAppointment {
    pub fn new(name: impl Into<String>, windows: Vec<ConstrainedWindow>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            windows,
            allow_splitting: false,
        }
    }

    pub fn with_window(mut self, window: ConstrainedWindow) -> Self {
        self.windows.push(window);
        self
    }

    pub fn with_splitting(mut self, allow: bool) -> Self {
        self.allow_splitting = allow;
        self
    }
}

/// Any appointment handed to the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Appointment {
    Fixed(FixedAppointment),
    Flexible(FlexibleAppointment),
    Constrained(ConstrainedAppointment),
}

impl Appointment {
    pub fn id(&self) -> AppointmentId {
        match self {
            Appointment::Fixed(a) => a.id,
            Appointment::Flexible(a) => a.id,
            Appointment::Constrained(a) => a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Appointment::Fixed(a) => &a.name,
            Appointment::Flexible(a) => &a.name,
            Appointment::Constrained(a) => &a.name,
        }
    }

    /// Identifier of the caller-supplied appointment (differs only for split parts).
    pub fn origin_id(&self) -> AppointmentId {
        match self {
            Appointment::Flexible(a) => a.origin_id(),
            other => other.id(),
        }
    }

    pub fn as_flexible(&self) -> Option<&FlexibleAppointment> {
        match self {
            Appointment::Flexible(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Appointment::Fixed(_))
    }

    #[inline]
    pub fn is_flexible(&self) -> bool {
        matches!(self, Appointment::Flexible(_))
    }
}

impl From<FixedAppointment> for Appointment {
    fn from(a: FixedAppointment) -> Self {
        Appointment::Fixed(a)
    }
}

impl From<FlexibleAppointment> for Appointment {
    fn from(a: FlexibleAppointment) -> Self {
        Appointment::Flexible(a)
    }
}

impl From<ConstrainedAppointment> for Appointment {
    fn from(a: ConstrainedAppointment) -> Self {
        Appointment::Constrained(a)
    }
}
