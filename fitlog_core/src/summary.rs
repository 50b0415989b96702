//! Read-only analytics over store snapshots.
//!
//! These work on the copies the store hands out, so they never touch the
//! store's own collections.

use crate::{BodyComposition, RecordStore, Workout, WorkoutStatus};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Weight change between the first and last weighed entry
#[derive(Clone, Debug, PartialEq)]
pub struct WeightTrend {
    pub start_date: NaiveDate,
    pub start_weight: f64,
    pub end_date: NaiveDate,
    pub end_weight: f64,
    pub entries: usize,
}

impl WeightTrend {
    /// Positive when weight went up
    pub fn change(&self) -> f64 {
        self.end_weight - self.start_weight
    }
}

/// One workout's contribution to an exercise's progress
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub workout_id: u32,
    pub max_weight: f64,
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutFrequency {
    pub total_workouts: usize,
    pub workout_days: usize,
    pub per_day: BTreeMap<NaiveDate, usize>,
    pub per_week: f64,
}

/// Trend across `entries`, ignoring ones with no weight
pub fn weight_trend(entries: &[BodyComposition]) -> Option<WeightTrend> {
    let mut weighed: Vec<_> = entries.iter().filter(|e| e.weight() > 0.0).collect();
    weighed.sort_by_key(|e| e.date());

    let first = weighed.first()?;
    let last = weighed.last()?;
    Some(WeightTrend {
        start_date: first.date(),
        start_weight: first.weight(),
        end_date: last.date(),
        end_weight: last.weight(),
        entries: weighed.len(),
    })
}

/// Most recent body-composition entry
pub fn latest_measurement(store: &RecordStore) -> Option<BodyComposition> {
    let (_, latest) = store.data_date_range()?;
    store.load_body_composition(latest)
}

/// Max weight and volume per workout for one exercise, oldest first
///
/// Cancelled workouts do not count.
pub fn exercise_progress(workouts: &[Workout], exercise_id: u32) -> Vec<ProgressPoint> {
    let mut points: Vec<_> = workouts
        .iter()
        .filter(|w| w.status != WorkoutStatus::Cancelled)
        .filter_map(|w| {
            let performed: Vec<_> = w
                .exercises
                .iter()
                .filter(|e| e.exercise_id == exercise_id)
                .collect();
            if performed.is_empty() {
                return None;
            }
            Some(ProgressPoint {
                date: w.date,
                workout_id: w.id,
                max_weight: performed.iter().map(|e| e.max_weight()).fold(0.0, f64::max),
                volume: performed.iter().map(|e| e.volume()).sum(),
            })
        })
        .collect();
    points.sort_by_key(|p| (p.date, p.workout_id));
    points
}

/// Workout counts over `start..=end` (inclusive)
pub fn workout_frequency(workouts: &[Workout], start: NaiveDate, end: NaiveDate) -> WorkoutFrequency {
    let mut per_day = BTreeMap::new();
    for workout in workouts.iter().filter(|w| w.date >= start && w.date <= end) {
        *per_day.entry(workout.date).or_insert(0) += 1;
    }

    let total_workouts: usize = per_day.values().sum();
    let days = (end - start).num_days() + 1;
    let per_week = if days > 0 {
        total_workouts as f64 * 7.0 / days as f64
    } else {
        0.0
    };

    WorkoutFrequency {
        total_workouts,
        workout_days: per_day.len(),
        per_day,
        per_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Measurements, SetEntry, Sex, WorkoutExercise};
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn weigh_in(day: u32, weight: f64) -> BodyComposition {
        BodyComposition::new(
            date(day),
            Measurements {
                weight,
                ..Measurements::default()
            },
            Sex::Male,
        )
    }

    fn workout(id: u32, day: u32, sets: Vec<(u32, SetEntry)>) -> Workout {
        let mut w = Workout::new(date(day));
        w.id = id;
        for (exercise_id, set) in sets {
            w.add_exercise(WorkoutExercise::new(exercise_id, "Lift", vec![set]));
        }
        w
    }

    #[test]
    fn test_weight_trend() {
        let entries = vec![weigh_in(10, 176.0), weigh_in(1, 180.0), weigh_in(5, 0.0)];
        let trend = weight_trend(&entries).unwrap();

        assert_eq!(trend.start_date, date(1));
        assert_eq!(trend.end_date, date(10));
        assert_eq!(trend.entries, 2);
        assert_approx_eq!(trend.change(), -4.0);
    }

    #[test]
    fn test_weight_trend_needs_a_weight() {
        assert_eq!(weight_trend(&[]), None);
        assert_eq!(weight_trend(&[weigh_in(1, 0.0)]), None);
    }

    #[test]
    fn test_latest_measurement() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("data.json"));
        assert!(latest_measurement(&store).is_none());

        let mut entry = weigh_in(3, 180.0);
        entry.set_measurements(Measurements {
            weight: 180.0,
            waist: 34.0,
            height: 70.0,
            neck: 15.0,
        });
        store.save_body_composition(entry.clone()).unwrap();
        entry.set_date(date(8));
        entry.set_weight(178.0);
        store.save_body_composition(entry).unwrap();

        assert_eq!(latest_measurement(&store).unwrap().weight(), 178.0);
    }

    #[test]
    fn test_exercise_progress() {
        let mut cancelled = workout(3, 4, vec![(1, SetEntry::new(300.0, 1, 1))]);
        cancelled.status = WorkoutStatus::Cancelled;

        let workouts = vec![
            workout(2, 8, vec![(1, SetEntry::new(140.0, 5, 3)), (1, SetEntry::new(150.0, 3, 1))]),
            workout(1, 2, vec![(1, SetEntry::new(135.0, 5, 3)), (2, SetEntry::new(50.0, 10, 1))]),
            cancelled,
            workout(4, 9, vec![(2, SetEntry::new(55.0, 10, 1))]),
        ];

        let points = exercise_progress(&workouts, 1);
        assert_eq!(
            points,
            vec![
                ProgressPoint {
                    date: date(2),
                    workout_id: 1,
                    max_weight: 135.0,
                    volume: 2025.0,
                },
                ProgressPoint {
                    date: date(8),
                    workout_id: 2,
                    max_weight: 150.0,
                    volume: 2100.0 + 450.0,
                },
            ]
        );
        assert!(exercise_progress(&workouts, 99).is_empty());
    }

    #[test]
    fn test_workout_frequency() {
        let set = SetEntry::new(100.0, 5, 1);
        let workouts = vec![
            workout(1, 1, vec![(1, set)]),
            workout(2, 1, vec![(1, set)]),
            workout(3, 5, vec![(1, set)]),
            workout(4, 20, vec![(1, set)]),
        ];

        let freq = workout_frequency(&workouts, date(1), date(14));
        assert_eq!(freq.total_workouts, 3);
        assert_eq!(freq.workout_days, 2);
        assert_eq!(freq.per_day.get(&date(1)), Some(&2));
        assert_approx_eq!(freq.per_week, 1.5);

        let empty = workout_frequency(&workouts, date(14), date(1));
        assert_eq!(empty.total_workouts, 0);
        assert_eq!(empty.per_week, 0.0);
    }
}
