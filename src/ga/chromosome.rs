//! Week chromosome and its variation operators.
//!
//! # Encoding
//!
//! An individual is a complete [`WeekCalendar`]: fixed appointments at their
//! definite slots plus one slot per (possibly split) flexible appointment.
//! Operators work on the flat slot list and rebuild the calendar.
//!
//! # Operators
//!
//! - [`relocate_slot`]: move one flexible slot to a random valid spot.
//! - [`split_slot`]: replace one flexible slot by 2–4 contiguous parts.
//! - [`inherit_crossover`]: per caller appointment, copy its slots from a
//!   random parent.
//! - [`repair_overlaps`]: re-place flexible slots that collide after crossover.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::{Builder, Uuid};

use super::Individual;
use crate::error::ScheduleResult;
use crate::models::{Appointment, AppointmentId, Slot, WeekCalendar};
use crate::scheduler::SlotPlacer;

/// Most parts a split may produce.
pub const MAX_SPLIT_PARTS: usize = 4;

/// One candidate week.
///
/// Higher fitness = better week (maximization convention).
#[derive(Debug, Clone)]
pub struct WeekChromosome {
    pub week: WeekCalendar,
    pub fitness: f64,
}

impl Individual for WeekChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl WeekChromosome {
    /// Wraps a week with unevaluated fitness.
    pub fn new(week: WeekCalendar) -> Self {
        Self {
            week,
            fitness: f64::NEG_INFINITY,
        }
    }

    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self::new(WeekCalendar::from_slots(slots))
    }

    /// Flat copy of all slots.
    pub fn slots(&self) -> Vec<Slot> {
        self.week.slots().cloned().collect()
    }
}

// ======================== Mutation operators ========================

/// Moves the flexible slot at `index` to a random day and free spot.
///
/// Fixed slots are left alone. The slot being moved does not block its
/// own new position.
pub fn relocate_slot<R: Rng>(
    slots: &mut [Slot],
    index: usize,
    placer: &SlotPlacer<'_>,
    rng: &mut R,
) -> ScheduleResult<()> {
    let appointment = slots[index].appointment.clone();
    let Some(flex) = appointment.as_flexible() else {
        return Ok(());
    };

    let day = placer.choose_day(flex, rng)?;
    let others: Vec<Slot> = slots
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, s)| s.clone())
        .collect();
    slots[index] = placer.place(&appointment, day, &others, rng)?;
    Ok(())
}

/// Random part lengths for splitting `total` minutes on a `granularity` grid.
///
/// Every part is a positive multiple of the granularity except that the
/// last absorbs any sub-granularity remainder. Returns `None` when the
/// duration spans fewer than two granularity units.
pub fn split_durations<R: Rng>(total: i64, granularity: i64, rng: &mut R) -> Option<Vec<i64>> {
    if granularity <= 0 {
        return None;
    }
    let units = (total / granularity) as usize;
    if units < 2 {
        return None;
    }

    let parts = rng.random_range(2..=MAX_SPLIT_PARTS.min(units));
    let mut cuts: Vec<usize> = (1..units).collect();
    cuts.shuffle(rng);
    cuts.truncate(parts - 1);
    cuts.sort_unstable();

    let mut durations = Vec::with_capacity(parts);
    let mut previous = 0;
    for cut in cuts.into_iter().chain(std::iter::once(units)) {
        durations.push((cut - previous) as i64 * granularity);
        previous = cut;
    }
    if let Some(last) = durations.last_mut() {
        *last += total % granularity;
    }
    Some(durations)
}

/// Splits the flexible slot at `index` into contiguous parts in place.
///
/// The parts become new flexible appointments (ids drawn from `rng`)
/// covering exactly the original slot. Returns `false` without changes
/// when the slot is fixed, splitting is not allowed, or the duration is
/// too short.
pub fn split_slot<R: Rng>(
    slots: &mut Vec<Slot>,
    index: usize,
    granularity: i64,
    rng: &mut R,
) -> bool {
    let original = &slots[index];
    let Some(flex) = original.appointment.as_flexible() else {
        return false;
    };
    if !flex.allow_splitting {
        return false;
    }
    let Some(durations) = split_durations(original.duration_minutes(), granularity, rng) else {
        return false;
    };

    let count = durations.len();
    let mut start = original.start;
    let mut parts = Vec::with_capacity(count);
    for (i, minutes) in durations.into_iter().enumerate() {
        let id = random_id(rng);
        let child = flex.split_part(id, minutes, i + 1, count);
        let end = start + Duration::minutes(minutes);
        parts.push(
            Slot::new(start, end, Arc::new(Appointment::Flexible(child)))
                .with_weight(original.weight),
        );
        start = end;
    }

    slots.splice(index..=index, parts);
    true
}

fn random_id<R: Rng>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.random::<u128>().to_le_bytes())
        .into_uuid()
}

// ======================== Crossover operators ========================

/// Builds a child by inheriting each caller appointment from one parent.
///
/// Appointments are grouped by origin id so a split appointment moves as a
/// whole. Origins are visited once each, in shuffled order; a uniformly
/// chosen parent supplies all its slots for that origin, falling back to
/// the other parent when it has none.
///
/// The result is not checked for overlaps; see [`repair_overlaps`].
pub fn inherit_crossover<R: Rng>(a: &WeekChromosome, b: &WeekChromosome, rng: &mut R) -> Vec<Slot> {
    let mut seen: HashSet<AppointmentId> = HashSet::new();
    let mut origins: Vec<AppointmentId> = a
        .week
        .slots()
        .chain(b.week.slots())
        .map(|s| s.appointment.origin_id())
        .filter(|id| seen.insert(*id))
        .collect();
    origins.shuffle(rng);

    let mut child = Vec::new();
    for origin in origins {
        let (first, second) = if rng.random_bool(0.5) { (a, b) } else { (b, a) };
        let mut inherited = first.week.slots_for_origin(origin);
        if inherited.is_empty() {
            inherited = second.week.slots_for_origin(origin);
        }
        child.extend(inherited.into_iter().cloned());
    }
    child
}

/// Removes overlaps by re-placing colliding flexible slots.
///
/// Fixed slots always stay. Flexible slots are kept in start order as long
/// as they collide with nothing kept so far; the rest are placed anew on a
/// random feasible day.
///
/// # Errors
/// A capacity error if a displaced slot finds no new place.
pub fn repair_overlaps<R: Rng>(
    slots: Vec<Slot>,
    placer: &SlotPlacer<'_>,
    rng: &mut R,
) -> ScheduleResult<Vec<Slot>> {
    let (mut kept, mut flexible): (Vec<Slot>, Vec<Slot>) = slots
        .into_iter()
        .partition(|s| !s.appointment.is_flexible());
    flexible.sort_by_key(|s| (s.weekday_index(), s.day_minutes()));

    let mut displaced = Vec::new();
    for slot in flexible {
        if kept.iter().any(|k| k.overlaps(&slot)) {
            displaced.push(slot);
        } else {
            kept.push(slot);
        }
    }

    for slot in displaced {
        let Some(flex) = slot.appointment.as_flexible() else {
            continue;
        };
        let day = placer.choose_day(flex, rng)?;
        let placed = placer.place(&slot.appointment, day, &kept, rng)?;
        kept.push(placed);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessHours, FixedAppointment, FlexibleAppointment};
    use chrono::{NaiveDate, NaiveDateTime};
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

    fn flex_slot(appt: FlexibleAppointment, start: NaiveDateTime) -> Slot {
        let end = start + Duration::minutes(appt.duration_minutes);
        Slot::new(start, end, Arc::new(appt.into()))
    }

    fn fixed_slot(name: &str, start: NaiveDateTime, end: NaiveDateTime) -> Slot {
        let appointment = Arc::new(FixedAppointment::new(name, start, end).into());
        Slot::from_fixed(appointment).unwrap()
    }

    #[test]
    fn test_split_durations_conserve_total() {
        let mut rng = SmallRng::seed_from_u64(42);
        for total in [60, 90, 120, 135, 240] {
            for _ in 0..50 {
                let parts = split_durations(total, 30, &mut rng).unwrap();
                assert!((2..=4).contains(&parts.len()));
                assert_eq!(parts.iter().sum::<i64>(), total);
                assert!(parts.iter().all(|&p| p >= 30));
                assert!(parts[..parts.len() - 1].iter().all(|p| p % 30 == 0));
            }
        }
    }

    #[test]
    fn test_split_durations_too_short() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(split_durations(30, 30, &mut rng).is_none());
        assert!(split_durations(59, 30, &mut rng).is_none());
        assert!(split_durations(60, 0, &mut rng).is_none());
    }

    #[test]
    fn test_split_slot_covers_original() {
        let mut rng = SmallRng::seed_from_u64(42);
        let appt = FlexibleAppointment::new("Study", 120).with_splitting(true);
        let origin = appt.id;
        let start = dt(9, 10, 0);
        let mut slots = vec![
            fixed_slot("Standup", dt(9, 9, 0), dt(9, 9, 15)),
            flex_slot(appt, start),
        ];

        assert!(split_slot(&mut slots, 1, 30, &mut rng));
        let parts = &slots[1..];
        assert!(parts.len() >= 2 && parts.len() <= 4);
        assert_eq!(parts.first().unwrap().start, start);
        assert_eq!(parts.last().unwrap().end, dt(9, 12, 0));
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(parts.iter().map(Slot::duration_minutes).sum::<i64>(), 120);

        let ids: HashSet<AppointmentId> = parts.iter().map(Slot::appointment_id).collect();
        assert_eq!(ids.len(), parts.len());
        assert!(!ids.contains(&origin));
        assert!(parts.iter().all(|p| p.appointment.origin_id() == origin));
        assert_eq!(slots[0].appointment.name(), "Standup");
    }

    #[test]
    fn test_split_slot_refuses() {
        let mut rng = SmallRng::seed_from_u64(42);
        let no_split = FlexibleAppointment::new("Call", 120);
        let short = FlexibleAppointment::new("Ping", 30).with_splitting(true);
        let mut slots = vec![
            flex_slot(no_split, dt(9, 10, 0)),
            flex_slot(short, dt(9, 14, 0)),
            fixed_slot("Lunch", dt(9, 12, 0), dt(9, 13, 0)),
        ];
        assert!(!split_slot(&mut slots, 0, 30, &mut rng));
        assert!(!split_slot(&mut slots, 1, 30, &mut rng));
        assert!(!split_slot(&mut slots, 2, 30, &mut rng));
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn test_split_ids_follow_seed() {
        let appt = FlexibleAppointment::new("Study", 120).with_splitting(true);
        let make = || vec![flex_slot(appt.clone(), dt(9, 10, 0))];

        let (mut a, mut b) = (make(), make());
        split_slot(&mut a, 0, 30, &mut SmallRng::seed_from_u64(3));
        split_slot(&mut b, 0, 30, &mut SmallRng::seed_from_u64(3));
        let ids = |s: &[Slot]| s.iter().map(Slot::appointment_id).collect::<Vec<_>>();
        assert_eq!(ids(&a[..]), ids(&b[..]));
    }

    #[test]
    fn test_relocate_keeps_fixed_and_avoids_overlap() {
        let hours = BusinessHours::default();
        let placer = SlotPlacer::new(&hours, week_start());
        let mut rng = SmallRng::seed_from_u64(42);
        let fixed = fixed_slot("Standup", dt(8, 9, 0), dt(8, 9, 30));
        let mut slots = vec![
            fixed.clone(),
            flex_slot(FlexibleAppointment::new("Gym", 60), dt(8, 18, 0)),
        ];

        for _ in 0..50 {
            relocate_slot(&mut slots, 1, &placer, &mut rng).unwrap();
            relocate_slot(&mut slots, 0, &placer, &mut rng).unwrap();
            assert_eq!(slots[0].start, fixed.start);
            assert_eq!(slots[0].end, fixed.end);
            assert!(!slots[0].overlaps(&slots[1]));
            assert_eq!(slots[1].duration_minutes(), 60);
        }
    }

    #[test]
    fn test_crossover_inherits_every_origin_once() {
        let mut rng = SmallRng::seed_from_u64(42);
        let gym = FlexibleAppointment::new("Gym", 60);
        let study = FlexibleAppointment::new("Study", 120).with_splitting(true);
        let study_id = study.id;
        let standup = fixed_slot("Standup", dt(8, 9, 0), dt(8, 9, 30));

        let a = WeekChromosome::from_slots(vec![
            standup.clone(),
            flex_slot(gym.clone(), dt(9, 18, 0)),
            flex_slot(study.clone(), dt(10, 10, 0)),
        ]);
        let mut split = a.slots();
        let idx = split
            .iter()
            .position(|s| s.appointment_id() == study_id)
            .unwrap();
        assert!(split_slot(&mut split, idx, 30, &mut rng));
        let b = WeekChromosome::from_slots(split);

        for _ in 0..50 {
            let child = WeekChromosome::from_slots(inherit_crossover(&a, &b, &mut rng));
            assert_eq!(child.week.slots_for(standup.appointment_id()).len(), 1);
            assert_eq!(child.week.slots_for(gym.id).len(), 1);
            let study_slots = child.week.slots_for_origin(study_id);
            let minutes: i64 = study_slots.iter().map(|s| s.duration_minutes()).sum();
            assert_eq!(minutes, 120);
        }
    }

    #[test]
    fn test_repair_clears_conflicts() {
        let hours = BusinessHours::default();
        let placer = SlotPlacer::new(&hours, week_start());
        let mut rng = SmallRng::seed_from_u64(42);
        let slots = vec![
            fixed_slot("Standup", dt(8, 9, 0), dt(8, 10, 0)),
            flex_slot(FlexibleAppointment::new("Gym", 60), dt(8, 9, 30)),
            flex_slot(FlexibleAppointment::new("Read", 60), dt(8, 14, 0)),
            flex_slot(FlexibleAppointment::new("Call", 30), dt(8, 14, 30)),
        ];

        let repaired = repair_overlaps(slots, &placer, &mut rng).unwrap();
        assert_eq!(repaired.len(), 4);
        let week = WeekCalendar::from_slots(repaired);
        assert!(week.conflicts().is_empty());
        let standup = week.slots().find(|s| s.appointment.is_fixed()).unwrap();
        assert_eq!(standup.start, dt(8, 9, 0));
        // Read kept its place, Call was moved
        let read = week
            .slots()
            .find(|s| s.appointment.name() == "Read")
            .unwrap();
        assert_eq!(read.start, dt(8, 14, 0));
    }
}
