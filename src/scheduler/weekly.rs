//! End-to-end week scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the appointments, business hours and GA configuration.
//! 2. Resolve constrained appointments into fixed ones (weighted interval
//!    scheduling over their candidate windows).
//! 3. Evolve a population of candidate weeks and keep the fittest.
//!
//! Constrained appointments that lose every window are left out of the
//! week and reported in [`WeekSchedule::resolution`].

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::kpi::WeekKpi;
use super::placement::DEFAULT_PLACEMENT_ATTEMPTS;
use crate::error::{ScheduleError, ScheduleResult};
use crate::ga::{GaConfig, GaRunner, GeneticOperators, WeeklyProblem};
use crate::models::{Appointment, BusinessHours, ConstrainedAppointment, WeekCalendar};
use crate::resolver::{Resolution, WindowResolver};
use crate::validation::validate_appointments;

/// Outcome of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSchedule {
    /// The fittest week found.
    pub calendar: WeekCalendar,
    pub fitness: f64,
    /// Fitness terms of `calendar`.
    pub kpi: WeekKpi,
    /// Best fitness after initialization, then after each generation.
    pub history: Vec<f64>,
    /// How constrained appointments were resolved.
    pub resolution: Resolution,
}

/// Plans one week of appointments.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_weekplan::ga::GaConfig;
/// use u_weekplan::models::{Appointment, BusinessHours, FlexibleAppointment};
/// use u_weekplan::scheduler::WeekScheduler;
///
/// let week_start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
/// let scheduler = WeekScheduler::new(BusinessHours::default(), week_start).with_config(
///     GaConfig::default()
///         .with_population_size(20)
///         .with_max_generations(10)
///         .with_seed(42),
/// );
///
/// let appointments: Vec<Appointment> = vec![
///     FlexibleAppointment::new("Gym", 60).into(),
///     FlexibleAppointment::new("Reading", 30).into(),
/// ];
/// let schedule = scheduler.schedule(&appointments).unwrap();
/// assert_eq!(schedule.calendar.slot_count(), 2);
/// assert!(schedule.calendar.conflicts().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct WeekScheduler {
    hours: BusinessHours,
    week_start: NaiveDate,
    config: GaConfig,
    operators: GeneticOperators,
    placement_attempts: usize,
}

impl WeekScheduler {
    /// Creates a scheduler for the week beginning on `week_start`.
    pub fn new(hours: BusinessHours, week_start: NaiveDate) -> Self {
        Self {
            hours,
            week_start,
            config: GaConfig::default(),
            operators: GeneticOperators::default(),
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    pub fn with_config(mut self, config: GaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_placement_attempts(mut self, attempts: usize) -> Self {
        self.placement_attempts = attempts;
        self
    }

    /// Schedules with a generator seeded from the config (or the OS).
    pub fn schedule(&self, appointments: &[Appointment]) -> ScheduleResult<WeekSchedule> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.schedule_with_rng(appointments, &mut rng)
    }

    /// Schedules with a caller-supplied generator.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidInput`] when validation finds problems
    /// - [`ScheduleError::InvalidConfig`] for bad hours or GA settings
    /// - a capacity error when some flexible appointment cannot be placed
    pub fn schedule_with_rng<R: Rng>(
        &self,
        appointments: &[Appointment],
        rng: &mut R,
    ) -> ScheduleResult<WeekSchedule> {
        validate_appointments(appointments)
            .map_err(ScheduleError::InvalidInput)?;
        self.hours.validate()?;
        self.config.validate()?;
        self.operators.validate()?;

        let mut constrained: Vec<ConstrainedAppointment> = Vec::new();
        let mut planned: Vec<Appointment> = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            match appointment {
                Appointment::Constrained(c) => constrained.push(c.clone()),
                other => planned.push(other.clone()),
            }
        }

        let resolution = WindowResolver::new(&constrained).resolve();
        if !resolution.unresolved.is_empty() {
            warn!(
                count = resolution.unresolved.len(),
                "constrained appointments left without a window"
            );
        }
        planned.extend(
            resolution
                .fixed
                .iter()
                .cloned()
                .map(Appointment::from),
        );

        info!(
            appointments = appointments.len(),
            constrained = constrained.len(),
            planned = planned.len(),
            "scheduling week"
        );

        let problem = WeeklyProblem::new(&planned, self.hours.clone(), self.week_start)?
            .with_operators(self.operators.clone())
            .with_placement_attempts(self.placement_attempts);
        let result = GaRunner::run_with_rng(&problem, &self.config, rng)?;

        let calendar = result.best.week;
        let kpi = WeekKpi::calculate(&calendar);
        info!(
            slots = calendar.slot_count(),
            fitness = result.best_fitness,
            "week scheduled"
        );

        Ok(WeekSchedule {
            calendar,
            fitness: result.best_fitness,
            kpi,
            history: result.history,
            resolution,
        })
    }
}
