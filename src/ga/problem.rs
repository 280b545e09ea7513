//! Week planning GA problem definition.
//!
//! Implements [`GaProblem`] for weekly appointment placement. Bridges the
//! domain models (appointments, business hours) to the generic GA loop.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;

use super::chromosome::WeekChromosome;
use super::operators::GeneticOperators;
use super::GaProblem;
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Appointment, BusinessHours, Slot};
use crate::scheduler::{SlotPlacer, WeekKpi, DEFAULT_PLACEMENT_ATTEMPTS};

/// GA problem for one week of fixed and flexible appointments.
///
/// Constrained appointments must be resolved to fixed ones beforehand.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_weekplan::ga::{GaConfig, GaRunner, WeeklyProblem};
/// use u_weekplan::models::{BusinessHours, FlexibleAppointment};
///
/// let week_start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
/// let problem = WeeklyProblem::new(
///     &[FlexibleAppointment::new("Gym", 60).into()],
///     BusinessHours::default(),
///     week_start,
/// )
/// .unwrap();
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(5)
///     .with_seed(42);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.best.week.slot_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct WeeklyProblem {
    /// Fixed appointments first, then flexible ones in input order.
    pub appointments: Vec<Arc<Appointment>>,
    pub hours: BusinessHours,
    pub week_start: NaiveDate,
    pub operators: GeneticOperators,
    /// Sampling budget per placement.
    pub placement_attempts: usize,
}

impl WeeklyProblem {
    /// Creates a problem from fixed and flexible appointments.
    ///
    /// # Errors
    /// [`ScheduleError::Unresolved`] for a constrained appointment.
    pub fn new(
        appointments: &[Appointment],
        hours: BusinessHours,
        week_start: NaiveDate,
    ) -> ScheduleResult<Self> {
        let mut fixed = Vec::new();
        let mut flexible = Vec::new();
        for appointment in appointments {
            match appointment {
                Appointment::Fixed(_) => fixed.push(Arc::new(appointment.clone())),
                Appointment::Flexible(_) => flexible.push(Arc::new(appointment.clone())),
                Appointment::Constrained(c) => {
                    return Err(ScheduleError::Unresolved {
                        name: c.name.clone(),
                    })
                }
            }
        }
        fixed.extend(flexible);

        Ok(Self {
            appointments: fixed,
            hours,
            week_start,
            operators: GeneticOperators::default(),
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        })
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_placement_attempts(mut self, attempts: usize) -> Self {
        self.placement_attempts = attempts;
        self
    }

    /// Placer bound to this problem's hours and week.
    pub fn placer(&self) -> SlotPlacer<'_> {
        SlotPlacer::new(&self.hours, self.week_start)
            .with_max_attempts(self.placement_attempts)
    }
}

impl GaProblem for WeeklyProblem {
    type Individual = WeekChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> ScheduleResult<WeekChromosome> {
        let placer = self.placer();
        let mut slots: Vec<Slot> = Vec::with_capacity(self.appointments.len());

        for appointment in &self.appointments {
            let day = match appointment.as_flexible() {
                Some(flex) => placer.choose_day(flex, rng)?,
                None => 0,
            };
            let slot = placer.place(appointment, day, &slots, rng)?;
            slots.push(slot);
        }

        Ok(WeekChromosome::from_slots(slots))
    }

    fn evaluate(&self, individual: &WeekChromosome) -> f64 {
        WeekKpi::calculate(&individual.week).fitness()
    }

    fn crossover<R: Rng>(
        &self,
        a: &WeekChromosome,
        b: &WeekChromosome,
        rng: &mut R,
    ) -> ScheduleResult<Vec<WeekChromosome>> {
        self.operators.crossover(a, b, &self.placer(), rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut WeekChromosome, rng: &mut R) -> ScheduleResult<()> {
        self.operators.mutate(individual, &self.placer(), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{GaConfig, GaRunner};
    use crate::models::{
        ConstrainedAppointment, ConstrainedWindow, FixedAppointment, FlexibleAppointment,
    };
    use chrono::{NaiveDateTime, NaiveTime};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn week_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
    }

    fn make_test_problem() -> WeeklyProblem {
        let appointments: Vec<Appointment> = vec![
            FlexibleAppointment::new("Gym", 60).into(),
            FixedAppointment::new("Standup", dt(8, 9, 0), dt(8, 9, 30)).into(),
            FlexibleAppointment::new("Study", 120)
                .with_splitting(true)
                .into(),
            FixedAppointment::new("Dinner", dt(10, 19, 0), dt(10, 20, 0)).into(),
            FlexibleAppointment::new("Reading", 45).into(),
        ];
        WeeklyProblem::new(&appointments, BusinessHours::default(), week_start()).unwrap()
    }

    #[test]
    fn test_fixed_first() {
        let problem = make_test_problem();
        assert_eq!(problem.appointments.len(), 5);
        assert!(problem.appointments[0].is_fixed());
        assert!(problem.appointments[1].is_fixed());
        assert_eq!(problem.appointments[2].name(), "Gym");
    }

    #[test]
    fn test_rejects_constrained() {
        let window = ConstrainedWindow::at(dt(8, 14, 0), dt(8, 15, 0), 5);
        let appointments: Vec<Appointment> =
            vec![ConstrainedAppointment::new("Review", vec![window]).into()];
        let err = WeeklyProblem::new(&appointments, BusinessHours::default(), week_start())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Unresolved { .. }));
    }

    #[test]
    fn test_create_individual_has_no_overlap() {
        let problem = make_test_problem();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            let ch = problem.create_individual(&mut rng).unwrap();
            assert_eq!(ch.week.slot_count(), 5);
            assert!(ch.week.conflicts().is_empty());
            let opening = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
            let closing = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
            for slot in ch.week.slots().filter(|s| s.appointment.is_flexible()) {
                assert!(slot.start.time() >= opening);
                assert!(slot.end.time() <= closing);
            }
        }
    }

    #[test]
    fn test_fitness_is_kpi_sum() {
        let problem = make_test_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = problem.create_individual(&mut rng).unwrap();
        let kpi = WeekKpi::calculate(&ch.week);
        assert_eq!(problem.evaluate(&ch), kpi.fitness());
        assert!(problem.evaluate(&ch).is_finite());
    }

    #[test]
    fn test_fixed_slots_never_move() {
        let problem = make_test_problem();
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(15)
            .with_mutation_rate(0.5)
            .with_crossover_rate(0.5)
            .with_seed(42);

        let result = GaRunner::run(&problem, &config).unwrap();
        for individual in &result.population {
            let fixed: Vec<_> = individual
                .week
                .slots()
                .filter(|s| s.appointment.is_fixed())
                .map(|s| (s.appointment.name().to_string(), s.start, s.end))
                .collect();
            assert_eq!(fixed.len(), 2);
            assert!(fixed.contains(&("Standup".into(), dt(8, 9, 0), dt(8, 9, 30))));
            assert!(fixed.contains(&("Dinner".into(), dt(10, 19, 0), dt(10, 20, 0))));
        }
    }

    #[test]
    fn test_oversized_appointment_fails_first_individual() {
        let appointments: Vec<Appointment> =
            vec![FlexibleAppointment::new("Marathon", 24 * 60).into()];
        let problem =
            WeeklyProblem::new(&appointments, BusinessHours::default(), week_start()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(problem
            .create_individual(&mut rng)
            .unwrap_err()
            .is_capacity());
    }
}
