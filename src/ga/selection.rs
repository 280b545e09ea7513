//! Fitness-proportionate (roulette) selection.
//!
//! Raw fitness here can be negative or sum to zero, which breaks plain
//! normalization. Weights are therefore shifted so the worst individual
//! weighs zero; a pool whose shifted weights do not sum to a positive
//! finite number is sampled uniformly instead.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning", Ch. 1

use rand::prelude::IndexedRandom;
use rand::Rng;

use super::Individual;

/// Cumulative selection probabilities for `fitness` (last entry 1.0).
///
/// Returns `None` when the distribution would be degenerate.
pub fn cumulative_distribution(fitness: &[f64]) -> Option<Vec<f64>> {
    let min = fitness
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return None;
    }

    let weights: Vec<f64> = fitness
        .iter()
        .map(|&f| if f.is_finite() { f - min } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let mut acc = 0.0;
    let mut cumulative: Vec<f64> = weights
        .iter()
        .map(|w| {
            acc += w / total;
            acc
        })
        .collect();
    if let Some(last) = cumulative.last_mut() {
        *last = 1.0;
    }
    Some(cumulative)
}

/// Draws `count` individuals (with replacement) proportionally to shifted fitness.
pub fn roulette_select<I: Individual, R: Rng>(pool: &[I], count: usize, rng: &mut R) -> Vec<I> {
    if pool.is_empty() {
        return Vec::new();
    }

    let fitness: Vec<f64> = pool.iter().map(Individual::fitness).collect();
    match cumulative_distribution(&fitness) {
        Some(cumulative) => (0..count)
            .map(|_| {
                let r: f64 = rng.random();
                let idx = cumulative
                    .partition_point(|&c| c < r)
                    .min(pool.len() - 1);
                pool[idx].clone()
            })
            .collect(),
        None => (0..count)
            .filter_map(|_| pool.choose(rng).cloned())
            .collect(),
    }
}
