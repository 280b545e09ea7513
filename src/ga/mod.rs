//! GA-based week optimization.
//!
//! A small generational GA with elitism and roulette selection, plus the
//! week-planning encoding that runs on it.
//!
//! # Encoding
//!
//! An individual is a complete candidate week ([`WeekChromosome`]). Fixed
//! appointments sit at their own times; flexible appointments (or their
//! split parts) are placed by rejection sampling.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable mutation and crossover settings
//! - [`selection`]: Min-shifted roulette selection
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

mod chromosome;
pub mod operators;
mod problem;
mod runner;
pub mod selection;

use rand::Rng;

use crate::error::ScheduleResult;

pub use chromosome::{
    inherit_crossover, relocate_slot, repair_overlaps, split_durations, split_slot,
    WeekChromosome, MAX_SPLIT_PARTS,
};
pub use operators::{GeneticOperators, OverlapPolicy};
pub use problem::WeeklyProblem;
pub use runner::{GaConfig, GaResult, GaRunner};

/// A member of the population.
pub trait Individual: Clone {
    /// Cached fitness; higher is better.
    fn fitness(&self) -> f64;

    fn set_fitness(&mut self, fitness: f64);
}

/// Problem definition driven by [`GaRunner`].
///
/// Operators receive the run's generator so seeded runs are reproducible.
pub trait GaProblem {
    type Individual: Individual;

    /// Builds one random, feasible individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> ScheduleResult<Self::Individual>;

    /// Scores an individual (maximization).
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces zero or more children of `a` and `b`.
    fn crossover<R: Rng>(
        &self,
        a: &Self::Individual,
        b: &Self::Individual,
        rng: &mut R,
    ) -> ScheduleResult<Vec<Self::Individual>>;

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R) -> ScheduleResult<()>;
}
