//! Configurable genetic operators for week planning.
//!
//! [`GeneticOperators`] bundles the mutation knobs and the policy for
//! overlaps introduced by crossover.
//!
//! # Usage
//!
//! ```
//! use u_weekplan::ga::operators::{GeneticOperators, OverlapPolicy};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.overlap_policy, OverlapPolicy::Repair);
//! assert_eq!(ops.max_mutations, 3);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chromosome::{
    inherit_crossover, relocate_slot, repair_overlaps, split_slot, WeekChromosome,
};
use crate::error::{ScheduleError, ScheduleResult};
use crate::scheduler::SlotPlacer;

/// What to do with a crossover child whose slots collide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Re-place colliding flexible slots; drop the child if that fails.
    #[default]
    Repair,
    /// Keep the child as inherited, collisions included.
    Accept,
}

/// Runtime-selectable operator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneticOperators {
    /// Upper bound of slots touched per mutation (at least 1).
    pub max_mutations: usize,
    /// Chance that a touched flexible slot is split instead of moved.
    pub split_probability: f64,
    /// Crossover collision handling.
    pub overlap_policy: OverlapPolicy,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            max_mutations: 3,
            split_probability: 0.25,
            overlap_policy: OverlapPolicy::Repair,
        }
    }
}

impl GeneticOperators {
    pub fn with_max_mutations(mut self, count: usize) -> Self {
        self.max_mutations = count;
        self
    }

    pub fn with_split_probability(mut self, probability: f64) -> Self {
        self.split_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Checks that the split probability is a probability.
    pub fn validate(&self) -> ScheduleResult<()> {
        if !(0.0..=1.0).contains(&self.split_probability) {
            return Err(ScheduleError::InvalidConfig(format!(
                "split probability must be within [0, 1], got {}",
                self.split_probability
            )));
        }
        Ok(())
    }

    /// Mutates 1..=`max_mutations` random slots.
    ///
    /// A touched flexible slot is split with `split_probability` when its
    /// appointment allows it and is long enough; otherwise it is moved to a
    /// random day. Fixed slots are never touched.
    ///
    /// # Errors
    /// A capacity error when a moved slot finds no new place.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut WeekChromosome,
        placer: &SlotPlacer<'_>,
        rng: &mut R,
    ) -> ScheduleResult<()> {
        let mut slots = chromosome.slots();
        if slots.is_empty() {
            return Ok(());
        }

        let granularity = placer.hours().granularity_minutes;
        let count = rng.random_range(1..=self.max_mutations.max(1));
        for _ in 0..count {
            let index = rng.random_range(0..slots.len());
            if !slots[index].appointment.is_flexible() {
                continue;
            }
            if rng.random_bool(self.split_probability)
                && split_slot(&mut slots, index, granularity, rng)
            {
                continue;
            }
            relocate_slot(&mut slots, index, placer, rng)?;
        }

        *chromosome = WeekChromosome::from_slots(slots);
        Ok(())
    }

    /// Produces at most one child of `a` and `b`.
    ///
    /// Under [`OverlapPolicy::Repair`] a child that cannot be repaired is
    /// discarded and an empty list returned.
    pub fn crossover<R: Rng>(
        &self,
        a: &WeekChromosome,
        b: &WeekChromosome,
        placer: &SlotPlacer<'_>,
        rng: &mut R,
    ) -> ScheduleResult<Vec<WeekChromosome>> {
        let slots = inherit_crossover(a, b, rng);
        match self.overlap_policy {
            OverlapPolicy::Accept => Ok(vec![WeekChromosome::from_slots(slots)]),
            OverlapPolicy::Repair => match repair_overlaps(slots, placer, rng) {
                Ok(repaired) => Ok(vec![WeekChromosome::from_slots(repaired)]),
                Err(err) if err.is_capacity() => {
                    debug!(error = %err, "discarding unrepairable crossover child");
                    Ok(Vec::new())
                }
                Err(err) => Err(err),
            },
        }
    }
}
