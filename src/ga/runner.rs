//! Generational GA loop.
//!
//! Maximizes fitness over a fixed number of generations:
//!
//! 1. Keep the top `elite_count` individuals unchanged.
//! 2. Every individual may spawn a mutant (`mutation_rate`) and a
//!    crossover child with a random partner (`crossover_rate`).
//! 3. Refill the population from parents ∪ offspring by roulette selection.
//!
//! There is no convergence detection; elitism alone guarantees the best
//! fitness never drops between generations.

use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::selection::roulette_select;
use super::{GaProblem, Individual};
use crate::error::{ScheduleError, ScheduleResult};

/// GA run parameters.
///
/// # Example
/// ```
/// use u_weekplan::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_max_generations(20)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations to run.
    pub max_generations: usize,
    /// Individuals carried over unchanged (at least 1).
    pub elite_count: usize,
    /// Per-individual probability of producing a mutant.
    pub mutation_rate: f64,
    /// Per-individual probability of producing a crossover child.
    pub crossover_rate: f64,
    /// Seed for the internal generator. `None` = seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            max_generations: 1000,
            elite_count: 2,
            mutation_rate: 0.05,
            crossover_rate: 0.2,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks sizes and probabilities.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.population_size == 0 {
            return Err(ScheduleError::InvalidConfig("population size must be positive".into()));
        }
        if self.elite_count == 0 {
            return Err(ScheduleError::InvalidConfig("elite count must be at least 1".into()));
        }
        if self.elite_count > self.population_size {
            return Err(ScheduleError::InvalidConfig(format!(
                "elite count {} exceeds population size {}",
                self.elite_count, self.population_size
            )));
        }
        for (name, rate) in [
            ("mutation rate", self.mutation_rate),
            ("crossover rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ScheduleError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Fittest individual of the final population.
    pub best: I,
    pub best_fitness: f64,
    /// Generations actually run.
    pub generations: usize,
    /// Best fitness after initialization, then after each generation.
    pub history: Vec<f64>,
    /// Final population, elites first.
    pub population: Vec<I>,
}

/// Runs a [`GaProblem`] with a [`GaConfig`].
pub struct GaRunner;

impl GaRunner {
    /// Runs with a generator seeded from `config.seed` (or the OS).
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
    ) -> ScheduleResult<GaResult<P::Individual>> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::run_with_rng(problem, config, &mut rng)
    }

    /// Runs with a caller-supplied generator.
    ///
    /// # Errors
    /// Propagates the first error raised while creating or mutating an
    /// individual; no partial result is returned.
    pub fn run_with_rng<P: GaProblem, R: Rng>(
        problem: &P,
        config: &GaConfig,
        rng: &mut R,
    ) -> ScheduleResult<GaResult<P::Individual>> {
        config.validate()?;

        let mut population = Vec::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            let mut individual = problem.create_individual(rng)?;
            individual.set_fitness(problem.evaluate(&individual));
            population.push(individual);
        }
        sort_descending(&mut population);

        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(population[0].fitness());
        info!(
            population = config.population_size,
            generations = config.max_generations,
            initial_best = history[0],
            "starting evolution"
        );

        for generation in 0..config.max_generations {
            let elite: Vec<P::Individual> = population
                .iter()
                .take(config.elite_count)
                .cloned()
                .collect();

            let mut offspring = Vec::new();
            for individual in &population {
                if rng.random_bool(config.mutation_rate) {
                    let mut mutant = individual.clone();
                    problem.mutate(&mut mutant, rng)?;
                    mutant.set_fitness(problem.evaluate(&mutant));
                    offspring.push(mutant);
                }
                if rng.random_bool(config.crossover_rate) {
                    if let Some(partner) = population.choose(rng) {
                        for mut child in problem.crossover(individual, partner, rng)? {
                            child.set_fitness(problem.evaluate(&child));
                            offspring.push(child);
                        }
                    }
                }
            }

            let offspring_count = offspring.len();
            let mut pool = population;
            pool.extend(offspring);

            let refill = roulette_select(&pool, config.population_size - elite.len(), rng);
            population = elite;
            population.extend(refill);
            sort_descending(&mut population);

            let best = population[0].fitness();
            history.push(best);
            debug!(generation, best_fitness = best, offspring = offspring_count, "generation done");
        }

        let best = population[0].clone();
        let best_fitness = best.fitness();
        info!(best_fitness, "evolution finished");

        Ok(GaResult {
            best,
            best_fitness,
            generations: config.max_generations,
            history,
            population,
        })
    }
}

/// Sorts by fitness, best first. NaN sinks to the end.
fn sort_descending<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        let (fa, fb) = (a.fitness(), b.fitness());
        match (fa.is_nan(), fb.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => fb.total_cmp(&fa),
        }
    });
}
