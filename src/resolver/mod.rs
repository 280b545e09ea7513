//! Constrained-window resolution by weighted interval scheduling.
//!
//! Every constrained appointment offers one or more weekly candidate
//! windows. The resolver picks a set of pairwise non-overlapping windows of
//! maximum total priority, at most one per appointment, and turns each
//! pick into a [`FixedAppointment`].
//!
//! # Algorithm
//!
//! 1. Flatten (appointment, window) pairs; stable-sort by end time.
//! 2. `p[j]` = last candidate ending at or before candidate `j` starts.
//! 3. `best[j] = max(w[j] + best[p[j]], best[j-1])`.
//! 4. Walk back from the last candidate, taking `j` when including it is
//!    at least as good as skipping it and its appointment has no window yet.
//!
//! The one-window-per-appointment cap in step 4 is a greedy layer over the
//! DP. When it forces skipping a window whose appointment was already
//! satisfied further right, the result can fall short of the true optimum.
//!
//! # Complexity
//! O(n log n) for n candidate windows.
//!
//! # Reference
//! Kleinberg & Tardos (2005), "Algorithm Design", Ch. 6.1 (Weighted Interval Scheduling)

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AppointmentId, ConstrainedAppointment, ConstrainedWindow, FixedAppointment};

/// A flattened (appointment, window) pair.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Index of the owning appointment in the resolver input.
    pub owner: usize,
    pub window: &'a ConstrainedWindow,
}

impl Candidate<'_> {
    #[inline]
    fn weight(&self) -> i64 {
        self.window.priority
    }
}

/// Outcome of a resolver run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// One fixed appointment per accepted window, in time order.
    pub fixed: Vec<FixedAppointment>,
    /// Sum of accepted window priorities.
    pub total_weight: i64,
    /// Constrained appointments that received no window.
    pub unresolved: Vec<AppointmentId>,
}

/// Resolves constrained appointments into fixed ones.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_weekplan::models::{ConstrainedAppointment, ConstrainedWindow};
/// use u_weekplan::resolver::WindowResolver;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let at = |h: u32| day.and_hms_opt(h, 0, 0).unwrap();
/// let window = |h: u32, p: i64| ConstrainedWindow::at(at(h), at(h + 1), p);
/// let appointments = vec![
///     ConstrainedAppointment::new("Review", vec![window(14, 5)]),
///     ConstrainedAppointment::new("Planning", vec![window(14, 10)]),
/// ];
/// let resolution = WindowResolver::new(&appointments).resolve();
/// assert_eq!(resolution.fixed.len(), 1);
/// assert_eq!(resolution.fixed[0].name, "Planning");
/// ```
pub struct WindowResolver<'a> {
    appointments: &'a [ConstrainedAppointment],
}

impl<'a> WindowResolver<'a> {
    pub fn new(appointments: &'a [ConstrainedAppointment]) -> Self {
        Self { appointments }
    }

    /// Flattens all candidate windows, sorted by end time (ties keep input order).
    pub fn candidates(&self) -> Vec<Candidate<'a>> {
        let mut candidates: Vec<Candidate<'a>> = self
            .appointments
            .iter()
            .enumerate()
            .flat_map(|(owner, appt)| {
                appt.windows
                    .iter()
                    .map(move |window| Candidate { owner, window })
            })
            .collect();
        candidates.sort_by_key(|c| c.window.end);
        candidates
    }

    /// Runs the DP and reconstruction.
    pub fn resolve(&self) -> Resolution {
        let candidates = self.candidates();
        let p = predecessors(&candidates);
        let best = best_weights(&candidates, &p);
        let accepted = reconstruct(&candidates, &p, &best);

        let mut resolved = vec![false; self.appointments.len()];
        let mut total_weight = 0;
        let mut fixed = Vec::with_capacity(accepted.len());
        for j in accepted {
            let candidate = &candidates[j];
            let source = &self.appointments[candidate.owner];
            resolved[candidate.owner] = true;
            total_weight += candidate.weight();
            fixed.push(
                FixedAppointment::new(&source.name, candidate.window.start, candidate.window.end)
                    .with_id(source.id),
            );
        }

        let unresolved: Vec<AppointmentId> = self
            .appointments
            .iter()
            .zip(&resolved)
            .filter(|(_, &done)| !done)
            .map(|(a, _)| a.id)
            .collect();

        debug!(
            candidates = candidates.len(),
            accepted = fixed.len(),
            unresolved = unresolved.len(),
            total_weight,
            "resolved constrained windows"
        );

        Resolution {
            fixed,
            total_weight,
            unresolved,
        }
    }
}

/// Shorthand for `WindowResolver::new(appointments).resolve().fixed`.
pub fn resolve_constrained(appointments: &[ConstrainedAppointment]) -> Vec<FixedAppointment> {
    WindowResolver::new(appointments).resolve().fixed
}

/// Latest compatible predecessor of each candidate.
///
/// Ends are sorted, so "ends at or before my start" holds on a prefix of
/// `0..j` and a binary search finds its last index.
fn predecessors(candidates: &[Candidate<'_>]) -> Vec<Option<usize>> {
    (0..candidates.len())
        .map(|j| {
            let start = candidates[j].window.start;
            candidates[..j]
                .partition_point(|c| c.window.end <= start)
                .checked_sub(1)
        })
        .collect()
}

fn best_weights(candidates: &[Candidate<'_>], p: &[Option<usize>]) -> Vec<i64> {
    let mut best: Vec<i64> = Vec::with_capacity(candidates.len());
    for (j, candidate) in candidates.iter().enumerate() {
        let include = candidate.weight() + p[j].map_or(0, |i| best[i]);
        let exclude = if j > 0 { best[j - 1] } else { 0 };
        best.push(include.max(exclude));
    }
    best
}

/// Iterative backward walk; returns accepted indices in ascending order.
fn reconstruct(candidates: &[Candidate<'_>], p: &[Option<usize>], best: &[i64]) -> Vec<usize> {
    let mut satisfied: HashSet<usize> = HashSet::new();
    let mut accepted = Vec::new();
    let mut cursor = candidates.len().checked_sub(1);

    while let Some(j) = cursor {
        let include = candidates[j].weight() + p[j].map_or(0, |i| best[i]);
        let exclude = if j > 0 { best[j - 1] } else { 0 };

        if include >= exclude && satisfied.insert(candidates[j].owner) {
            accepted.push(j);
            cursor = p[j];
        } else {
            cursor = j.checked_sub(1);
        }
    }

    accepted.reverse();
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn window(d: u32, from: u32, to: u32, priority: i64) -> ConstrainedWindow {
        ConstrainedWindow::at(dt(d, from, 0), dt(d, to, 0), priority)
    }

    #[test]
    fn test_disjoint_windows_all_selected() {
        let appts = vec![
            ConstrainedAppointment::new("A", vec![window(8, 9, 10, 3)]),
            ConstrainedAppointment::new("B", vec![window(8, 10, 11, 4)]),
            ConstrainedAppointment::new("C", vec![window(10, 14, 16, 7)]),
        ];
        let res = WindowResolver::new(&appts).resolve();
        assert_eq!(res.fixed.len(), 3);
        assert_eq!(res.total_weight, 14);
        assert!(res.unresolved.is_empty());
        assert_eq!(res.fixed[0].name, "A");
        assert_eq!(res.fixed[1].start, dt(8, 10, 0));
    }

    #[test]
    fn test_overlapping_pair_keeps_heavier() {
        // Monday 14:00-15:00, priorities 5 and 10
        let low = ConstrainedAppointment::new("Low", vec![window(8, 14, 15, 5)]);
        let high = ConstrainedAppointment::new("High", vec![window(8, 14, 15, 10)]);
        let appts = vec![low.clone(), high.clone()];

        let res = WindowResolver::new(&appts).resolve();
        assert_eq!(res.fixed.len(), 1);
        assert_eq!(res.fixed[0].name, "High");
        assert_eq!(res.fixed[0].id, high.id);
        assert_eq!(res.fixed[0].start, dt(8, 14, 0));
        assert_eq!(res.fixed[0].end, dt(8, 15, 0));
        assert_eq!(res.unresolved, vec![low.id]);

        // Input order does not matter
        let reversed = vec![high, low];
        let res = WindowResolver::new(&reversed).resolve();
        assert_eq!(res.fixed.len(), 1);
        assert_eq!(res.fixed[0].name, "High");
    }

    #[test]
    fn test_single_window_always_selected() {
        let appts = vec![
            ConstrainedAppointment::new("Solo", vec![window(9, 8, 9, 1)]),
            ConstrainedAppointment::new(
                "Choice",
                vec![window(9, 12, 13, 2), window(11, 12, 13, 6)],
            ),
        ];
        let res = WindowResolver::new(&appts).resolve();
        assert_eq!(res.fixed.len(), 2);
        assert!(res.fixed.iter().any(|f| f.name == "Solo"));
    }

    #[test]
    fn test_one_window_per_appointment() {
        // Both windows of the same appointment are disjoint; only one may win.
        let appts = vec![ConstrainedAppointment::new(
            "Gym",
            vec![window(8, 9, 10, 4), window(10, 9, 10, 8)],
        )];
        let res = WindowResolver::new(&appts).resolve();
        assert_eq!(res.fixed.len(), 1);
        assert_eq!(res.fixed[0].start, dt(10, 9, 0));
        assert_eq!(res.total_weight, 8);
    }

    #[test]
    fn test_chain_prefers_heavier_combination() {
        // One long window against two short ones that together weigh more.
        let appts = vec![
            ConstrainedAppointment::new("Long", vec![window(8, 9, 13, 10)]),
            ConstrainedAppointment::new("Early", vec![window(8, 9, 11, 6)]),
            ConstrainedAppointment::new("Late", vec![window(8, 11, 13, 6)]),
        ];
        let res = WindowResolver::new(&appts).resolve();
        let names: Vec<&str> = res.fixed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late"]);
        assert_eq!(res.total_weight, 12);
    }

    #[test]
    fn test_inputs_untouched_and_rerunnable() {
        let appts = vec![
            ConstrainedAppointment::new("A", vec![window(8, 9, 10, 3)]),
            ConstrainedAppointment::new("B", vec![window(8, 9, 10, 4)]),
        ];
        let snapshot = appts.clone();
        let first = resolve_constrained(&appts);
        let second = resolve_constrained(&appts);
        assert_eq!(appts, snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let res = WindowResolver::new(&[]).resolve();
        assert!(res.fixed.is_empty());
        assert_eq!(res.total_weight, 0);
    }

    #[test]
    fn test_predecessors() {
        let appts = vec![
            ConstrainedAppointment::new("A", vec![window(8, 9, 10, 1)]),
            ConstrainedAppointment::new("B", vec![window(8, 9, 11, 1)]),
            ConstrainedAppointment::new("C", vec![window(8, 10, 12, 1)]),
            ConstrainedAppointment::new("D", vec![window(8, 11, 13, 1)]),
        ];
        let resolver = WindowResolver::new(&appts);
        let candidates = resolver.candidates();
        let p = predecessors(&candidates);
        assert_eq!(p, vec![None, None, Some(0), Some(1)]);
    }
}
