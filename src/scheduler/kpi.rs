//! Week quality metrics.
//!
//! Breaks the GA fitness into its terms so callers can see why one week
//! beats another.
//!
//! # Metrics
//!
//! | Term | Definition |
//! |------|-----------|
//! | Slot balance | −Σ\|slots(d) − mean\| |
//! | Workload balance | −Σ\|busy(d) − mean\| (minutes) |
//! | Weekend penalty | −2 × (Saturday + Sunday busy minutes) |
//! | Lateness bonus | Σ (start hour + start minute / 60) over all slots |
//!
//! Means are taken over all seven days. Fitness is the plain sum; higher
//! is better.

use serde::{Deserialize, Serialize};

use crate::models::{WeekCalendar, DAYS_PER_WEEK};

/// Weight of weekend busy minutes in the fitness.
pub const WEEKEND_WEIGHT: f64 = 2.0;

/// Fitness terms of one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekKpi {
    /// Rewards an even number of appointments per day (≤ 0).
    pub slot_balance: f64,
    /// Rewards an even number of busy minutes per day (≤ 0).
    pub workload_balance: f64,
    /// Penalizes weekend load (≤ 0).
    pub weekend_penalty: f64,
    /// Rewards later starts (≥ 0).
    pub lateness_bonus: f64,
}

impl WeekKpi {
    /// Computes all terms for a week.
    pub fn calculate(week: &WeekCalendar) -> Self {
        let slots = week.slots_per_day().map(|n| n as f64);
        let busy = week.busy_minutes_per_day().map(|m| m as f64);

        Self {
            slot_balance: -absolute_deviation(&slots),
            workload_balance: -absolute_deviation(&busy),
            weekend_penalty: -WEEKEND_WEIGHT * week.weekend_minutes() as f64,
            lateness_bonus: week.slots().map(|s| s.start_hour()).sum(),
        }
    }

    /// Sum of all terms.
    pub fn fitness(&self) -> f64 {
        self.slot_balance + self.workload_balance + self.weekend_penalty + self.lateness_bonus
    }
}

/// Σ|x − mean(x)| over the seven days.
fn absolute_deviation(values: &[f64; DAYS_PER_WEEK]) -> f64 {
    let mean = values.iter().sum::<f64>() / DAYS_PER_WEEK as f64;
    values.iter().map(|v| (v - mean).abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlexibleAppointment, Slot};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn slot(start: NaiveDateTime, minutes: i64) -> Slot {
        Slot::new(
            start,
            start + chrono::Duration::minutes(minutes),
            Arc::new(FlexibleAppointment::new("x", minutes).into()),
        )
    }

    #[test]
    fn test_empty_week() {
        let kpi = WeekKpi::calculate(&WeekCalendar::new());
        assert_eq!(kpi, WeekKpi::default());
        assert_eq!(kpi.fitness(), 0.0);
    }

    #[test]
    fn test_terms() {
        // Sunday 10:00 (60 min) and Monday 14:30 (60 min)
        let week = WeekCalendar::from_slots(vec![slot(dt(7, 10, 0), 60), slot(dt(8, 14, 30), 60)]);
        let kpi = WeekKpi::calculate(&week);

        // slots per day [2,2,1,1,1,1,1], mean 9/7
        let mean = 9.0 / 7.0;
        let expected_slots = 2.0 * (2.0 - mean) + 5.0 * (mean - 1.0);
        assert!((kpi.slot_balance + expected_slots).abs() < 1e-9);

        // busy [60,60,0,0,0,0,0], mean 120/7
        let mean = 120.0 / 7.0;
        let expected_busy = 2.0 * (60.0 - mean) + 5.0 * mean;
        assert!((kpi.workload_balance + expected_busy).abs() < 1e-9);

        assert_eq!(kpi.weekend_penalty, -120.0);
        assert!((kpi.lateness_bonus - 24.5).abs() < 1e-9);
        let sum =
            kpi.slot_balance + kpi.workload_balance + kpi.weekend_penalty + kpi.lateness_bonus;
        assert!((kpi.fitness() - sum).abs() < 1e-9);
    }

    #[test]
    fn test_weekday_beats_weekend() {
        let weekend = WeekCalendar::from_slots(vec![slot(dt(13, 12, 0), 60)]);
        let weekday = WeekCalendar::from_slots(vec![slot(dt(10, 12, 0), 60)]);
        assert!(WeekKpi::calculate(&weekday).fitness() > WeekKpi::calculate(&weekend).fitness());
    }

    #[test]
    fn test_later_start_scores_higher() {
        let early = WeekCalendar::from_slots(vec![slot(dt(10, 8, 0), 30)]);
        let late = WeekCalendar::from_slots(vec![slot(dt(10, 20, 0), 30)]);
        assert!(WeekKpi::calculate(&late).fitness() > WeekKpi::calculate(&early).fitness());
    }
}
