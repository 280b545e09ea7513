//! Business-hours configuration.
//!
//! Flexible appointments are only placed inside the daily window
//! `[start, end)`. The granularity is the unit split boundaries align to.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Daily window eligible for flexible placement.
///
/// # Examples
///
/// ```
/// use u_weekplan::models::BusinessHours;
///
/// let hours = BusinessHours::default();
/// assert_eq!(hours.span_minutes(), 15 * 60 + 30);
/// assert_eq!(hours.day_count(), 7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusinessHours {
    /// Earliest clock-time a flexible slot may start.
    pub start: NaiveTime,
    /// Latest clock-time a flexible slot may end.
    pub end: NaiveTime,
    /// Elementary time unit in minutes.
    pub granularity_minutes: i64,
    /// Labels of the days a flexible slot may land on, starting at the week start.
    pub week_days: Vec<String>,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start: clock(8, 0),
            end: clock(23, 30),
            granularity_minutes: 30,
            week_days: [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        }
    }
}

impl BusinessHours {
    /// Creates business hours with default granularity and week days.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_granularity(mut self, minutes: i64) -> Self {
        self.granularity_minutes = minutes;
        self
    }

    pub fn with_week_days(mut self, days: Vec<String>) -> Self {
        self.week_days = days;
        self
    }

    /// Length of the daily window in minutes.
    #[inline]
    pub fn span_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Number of days a flexible appointment may be placed on.
    #[inline]
    pub fn day_count(&self) -> usize {
        self.week_days.len()
    }

    /// Absolute window on `week_start + day` days.
    pub fn window_on(&self, week_start: NaiveDate, day: usize) -> (NaiveDateTime, NaiveDateTime) {
        let date = week_start + Duration::days(day as i64);
        (date.and_time(self.start), date.and_time(self.end))
    }

    /// Checks that the window is non-empty and the week has 1..=7 days.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.end <= self.start {
            return Err(ScheduleError::InvalidConfig(format!(
                "business hours end {} is not after start {}",
                self.end, self.start
            )));
        }
        if self.granularity_minutes <= 0 {
            return Err(ScheduleError::InvalidConfig(format!(
                "granularity must be positive, got {}",
                self.granularity_minutes
            )));
        }
        if self.week_days.is_empty() || self.week_days.len() > 7 {
            return Err(ScheduleError::InvalidConfig(format!(
                "expected 1 to 7 week days, got {}",
                self.week_days.len()
            )));
        }
        Ok(())
    }
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .unwrap_or(NaiveTime::MIN)
}
