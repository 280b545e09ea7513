//! Random slot placement for flexible appointments.
//!
//! # Algorithm
//!
//! Rejection sampling: draw a uniform start minute inside the day's
//! business hours (clipped by the deadline), build the candidate slot and
//! keep it if it collides with nothing already placed. The business window
//! is large relative to typical durations, so retries are cheap; a fixed
//! budget bounds the search.
//!
//! Fixed appointments bypass sampling and keep their own times.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::warn;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Appointment, BusinessHours, FlexibleAppointment, Slot};

/// Default number of sampling attempts per placement.
pub const DEFAULT_PLACEMENT_ATTEMPTS: usize = 500;

/// Places appointments into the week starting at `week_start`.
#[derive(Debug, Clone)]
pub struct SlotPlacer<'a> {
    hours: &'a BusinessHours,
    week_start: NaiveDate,
    max_attempts: usize,
}

impl<'a> SlotPlacer<'a> {
    pub fn new(hours: &'a BusinessHours, week_start: NaiveDate) -> Self {
        Self {
            hours,
            week_start,
            max_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    /// Sets the sampling budget (at least one attempt).
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn hours(&self) -> &BusinessHours {
        self.hours
    }

    /// Weekday bucket (Sunday = 0) of the given day offset.
    pub fn weekday_of(&self, day: usize) -> usize {
        let date = self.week_start + Duration::days(day as i64);
        date.weekday().num_days_from_sunday() as usize
    }

    /// Picks a uniformly random day on which the deadline is still reachable.
    pub fn choose_day<R: Rng>(
        &self,
        appointment: &FlexibleAppointment,
        rng: &mut R,
    ) -> ScheduleResult<usize> {
        let feasible: Vec<usize> = (0..self.hours.day_count())
            .filter(|&day| self.latest_offset(appointment, day) >= 0)
            .collect();

        match feasible.choose(rng) {
            Some(&day) => Ok(day),
            None => Err(self.capacity_error(appointment, 0)),
        }
    }

    /// Places `appointment` on `day` without colliding with `occupied`.
    ///
    /// `occupied` may hold slots of any day; only those on the target
    /// weekday matter.
    ///
    /// # Errors
    /// A capacity error when the appointment cannot fit the business day,
    /// cannot meet its deadline on this day, or no free spot was found
    /// within the attempt budget. [`ScheduleError::Unresolved`] for
    /// constrained appointments.
    pub fn place<R: Rng>(
        &self,
        appointment: &Arc<Appointment>,
        day: usize,
        occupied: &[Slot],
        rng: &mut R,
    ) -> ScheduleResult<Slot> {
        if let Some(slot) = Slot::from_fixed(appointment.clone()) {
            return Ok(slot);
        }
        match appointment.as_ref() {
            Appointment::Flexible(flex) => self.sample(flex, appointment, day, occupied, rng),
            other => Err(ScheduleError::Unresolved {
                name: other.name().to_string(),
            }),
        }
    }

    fn sample<R: Rng>(
        &self,
        flex: &FlexibleAppointment,
        appointment: &Arc<Appointment>,
        day: usize,
        occupied: &[Slot],
        rng: &mut R,
    ) -> ScheduleResult<Slot> {
        let latest = self.latest_offset(flex, day);
        if latest < 0 {
            return Err(self.capacity_error(flex, 0));
        }

        let (day_start, _) = self.hours.window_on(self.week_start, day);
        let duration = Duration::minutes(flex.duration_minutes);

        for _ in 0..self.max_attempts {
            let offset = rng.random_range(0..=latest);
            let start = day_start + Duration::minutes(offset);
            let candidate = Slot::new(start, start + duration, appointment.clone());
            if !occupied.iter().any(|s| s.overlaps(&candidate)) {
                return Ok(candidate);
            }
        }

        Err(self.capacity_error(flex, self.max_attempts))
    }

    /// Largest start offset (minutes after opening) that respects the
    /// business window and the deadline; negative when nothing fits.
    fn latest_offset(&self, flex: &FlexibleAppointment, day: usize) -> i64 {
        let mut latest = self.hours.span_minutes() - flex.duration_minutes;
        if let Some(deadline) = flex.deadline_bound() {
            let (day_start, _) = self.hours.window_on(self.week_start, day);
            latest = latest.min((deadline - day_start).num_minutes() - flex.duration_minutes);
        }
        latest
    }

    fn capacity_error(&self, flex: &FlexibleAppointment, attempts: usize) -> ScheduleError {
        let available = self.hours.span_minutes();
        let err = if flex.duration_minutes > available {
            ScheduleError::ExceedsBusinessDay {
                name: flex.name.clone(),
                minutes: flex.duration_minutes,
                available,
            }
        } else if let (0, Some(deadline)) = (attempts, flex.deadline_bound()) {
            ScheduleError::DeadlineUnreachable {
                name: flex.name.clone(),
                deadline,
            }
        } else {
            ScheduleError::NoFreeSlot {
                name: flex.name.clone(),
                attempts,
            }
        };
        warn!(error = %err, "placement failed");
        err
    }
}
