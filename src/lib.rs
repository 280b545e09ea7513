//! Weekly appointment planner.
//!
//! Turns a mix of fixed, flexible and window-constrained appointments into
//! a conflict-free week. Constrained appointments are resolved by weighted
//! interval scheduling; flexible ones are placed and refined by a genetic
//! algorithm that balances the week and keeps weekends light.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Appointment`, `ConstrainedWindow`, `Slot`,
//!   `WeekCalendar`, `BusinessHours`
//! - **`resolver`**: Constrained-window resolution (weighted interval scheduling)
//! - **`scheduler`**: Slot placement, `WeekKpi`, and the `WeekScheduler` facade
//! - **`ga`**: Week chromosome, operators, and the generational GA loop
//! - **`validation`**: Input integrity checks (duplicate IDs, inverted intervals)
//! - **`error`**: `ScheduleError` and `ScheduleResult`
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_weekplan::ga::GaConfig;
//! use u_weekplan::models::{
//!     Appointment, BusinessHours, ConstrainedAppointment, ConstrainedWindow,
//!     FlexibleAppointment,
//! };
//! use u_weekplan::scheduler::WeekScheduler;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
//! let appointments: Vec<Appointment> = vec![
//!     FlexibleAppointment::new("Gym", 60).into(),
//!     ConstrainedAppointment::new(
//!         "Lesson",
//!         vec![ConstrainedWindow::at(
//!             monday.and_hms_opt(18, 0, 0).unwrap(),
//!             monday.and_hms_opt(19, 0, 0).unwrap(),
//!             5,
//!         )],
//!     )
//!     .into(),
//! ];
//!
//! let week_start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let schedule = WeekScheduler::new(BusinessHours::default(), week_start)
//!     .with_config(
//!         GaConfig::default()
//!             .with_population_size(20)
//!             .with_max_generations(10)
//!             .with_seed(1),
//!     )
//!     .schedule(&appointments)
//!     .unwrap();
//! assert_eq!(schedule.calendar.slot_count(), 2);
//! ```
//!
//! # References
//!
//! - Kleinberg & Tardos (2005), "Algorithm Design"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

pub mod error;
pub mod ga;
pub mod models;
pub mod resolver;
pub mod scheduler;
pub mod validation;

pub use error::{ScheduleError, ScheduleResult};
