//! Slot placement, week evaluation and the end-to-end scheduler.
//!
//! # Placement
//!
//! `SlotPlacer` drops flexible appointments into free, deadline-respecting
//! spots of a chosen day by rejection sampling.
//!
//! # KPI
//!
//! `WeekKpi` breaks a week's fitness into balance, weekend and lateness
//! terms.
//!
//! # Scheduler
//!
//! `WeekScheduler` validates input, resolves constrained appointments and
//! runs the GA.
//!
//! # References
//!
//! - Kleinberg & Tardos (2005), "Algorithm Design", Ch. 6.1
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

mod kpi;
mod placement;
mod weekly;

pub use kpi::{WeekKpi, WEEKEND_WEIGHT};
pub use placement::{SlotPlacer, DEFAULT_PLACEMENT_ATTEMPTS};
pub use weekly::{WeekSchedule, WeekScheduler};
