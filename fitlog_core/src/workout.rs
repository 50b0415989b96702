//! Workout logs: workouts, the exercises performed in them, and their sets.

use crate::Exercise;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Lifecycle tag of a workout
///
/// Any status may be set at any time; nothing guards the transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WorkoutStatus {
    #[default]
    InProgress,
    Completed,
    Cancelled,
}

impl WorkoutStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutStatus::InProgress => "in_progress",
            WorkoutStatus::Completed => "completed",
            WorkoutStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status tag; anything unrecognised is treated as in progress
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" => WorkoutStatus::Completed,
            "cancelled" | "canceled" => WorkoutStatus::Cancelled,
            _ => WorkoutStatus::InProgress,
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// `reps` repetitions at `weight`, performed `sets` times
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetEntry {
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
}

impl SetEntry {
    pub fn new(weight: f64, reps: u32, sets: u32) -> Self {
        Self { weight, reps, sets }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.weight.is_finite() || self.weight < 0.0 {
            errors.push("Weight cannot be negative".to_string());
        }
        if self.reps == 0 {
            errors.push("Reps must be greater than 0".to_string());
        }
        if self.sets == 0 {
            errors.push("Sets must be greater than 0".to_string());
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Total load moved: weight × reps × sets
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps) * f64::from(self.sets)
    }
}

impl Default for SetEntry {
    fn default() -> Self {
        Self {
            weight: 0.0,
            reps: 0,
            sets: 1,
        }
    }
}

/// One exercise performed within a workout
///
/// `exercise_name` is a snapshot taken when the entry was made, so renaming
/// or deleting the library exercise later leaves history unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutExercise {
    pub id: u32,
    pub workout_id: u32,
    pub exercise_id: u32,
    pub exercise_name: String,
    pub sets: Vec<SetEntry>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutExercise {
    pub fn new(exercise_id: u32, exercise_name: impl Into<String>, sets: Vec<SetEntry>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            workout_id: 0,
            exercise_id,
            exercise_name: exercise_name.into(),
            sets,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reference a library exercise, snapshotting its current name
    pub fn from_exercise(exercise: &Exercise, sets: Vec<SetEntry>) -> Self {
        Self::new(exercise.id, exercise.name.clone(), sets)
    }

    pub fn add_set(&mut self, set: SetEntry) {
        self.sets.push(set);
    }

    pub fn remove_set(&mut self, index: usize) -> Option<SetEntry> {
        (index < self.sets.len()).then(|| self.sets.remove(index))
    }

    pub fn clear_sets(&mut self) {
        self.sets.clear();
    }

    pub fn total_sets(&self) -> u32 {
        self.sets.iter().map(|s| s.sets).sum()
    }

    pub fn volume(&self) -> f64 {
        self.sets.iter().map(SetEntry::volume).sum()
    }

    /// Heaviest weight across all sets, 0 when there are none
    pub fn max_weight(&self) -> f64 {
        self.sets.iter().map(|s| s.weight).fold(0.0, f64::max)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.exercise_id == 0 {
            errors.push("Invalid exercise ID".to_string());
        }
        if self.exercise_name.trim().is_empty() {
            errors.push("Exercise name cannot be empty".to_string());
        }

        if self.sets.is_empty() {
            errors.push("At least one set is required".to_string());
        } else {
            for (i, set) in self.sets.iter().enumerate() {
                let set_errors = set.validate();
                if !set_errors.is_empty() {
                    errors.push(format!("Set {} is invalid: {}", i + 1, set_errors.join(", ")));
                }
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// A training session on a given date
#[derive(Clone, Debug, PartialEq)]
pub struct Workout {
    pub id: u32,
    pub date: NaiveDate,
    pub notes: String,
    pub status: WorkoutStatus,
    pub exercises: Vec<WorkoutExercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            date,
            notes: String::new(),
            status: WorkoutStatus::InProgress,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: WorkoutStatus) {
        self.status = status;
    }

    pub fn add_exercise(&mut self, exercise: WorkoutExercise) {
        self.exercises.push(exercise);
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<WorkoutExercise> {
        (index < self.exercises.len()).then(|| self.exercises.remove(index))
    }

    pub fn clear_exercises(&mut self) {
        self.exercises.clear();
    }

    /// No exercises logged yet
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(WorkoutExercise::total_sets).sum()
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(WorkoutExercise::volume).sum()
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, exercise) in self.exercises.iter().enumerate() {
            for err in exercise.validate() {
                errors.push(format!("Exercise {}: {}", i + 1, err));
            }
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseCategory;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn bench() -> WorkoutExercise {
        WorkoutExercise::new(1, "Bench Press", vec![SetEntry::new(135.0, 10, 3)])
    }

    #[rstest]
    #[case("in_progress", WorkoutStatus::InProgress)]
    #[case("completed", WorkoutStatus::Completed)]
    #[case("cancelled", WorkoutStatus::Cancelled)]
    #[case("paused", WorkoutStatus::InProgress)]
    #[case("", WorkoutStatus::InProgress)]
    fn test_parse_status(#[case] input: &str, #[case] expected: WorkoutStatus) {
        assert_eq!(WorkoutStatus::parse(input), expected);
    }

    #[test]
    fn test_status_is_a_free_setter() {
        let mut workout = Workout::new(date());
        workout.set_status(WorkoutStatus::Completed);
        workout.set_status(WorkoutStatus::InProgress);
        workout.set_status(WorkoutStatus::Cancelled);
        assert_eq!(workout.status, WorkoutStatus::Cancelled);
    }

    #[rstest]
    #[case::valid(SetEntry::new(0.0, 5, 1), vec![])]
    #[case::negative_weight(SetEntry::new(-5.0, 5, 1), vec!["Weight cannot be negative"])]
    #[case::no_reps(SetEntry::new(50.0, 0, 1), vec!["Reps must be greater than 0"])]
    #[case::no_sets(SetEntry::new(50.0, 5, 0), vec!["Sets must be greater than 0"])]
    fn test_set_validation(#[case] set: SetEntry, #[case] expected: Vec<&str>) {
        assert_eq!(set.validate(), expected);
    }

    #[test]
    fn test_set_volume_counts_repeats() {
        assert_eq!(SetEntry::new(100.0, 5, 3).volume(), 1500.0);
    }

    #[test]
    fn test_workout_exercise_requires_sets_and_reference() {
        let entry = WorkoutExercise::new(0, " ", vec![]);
        assert_eq!(
            entry.validate(),
            vec![
                "Invalid exercise ID",
                "Exercise name cannot be empty",
                "At least one set is required",
            ]
        );
    }

    #[test]
    fn test_workout_exercise_reports_bad_set_position() {
        let mut entry = bench();
        entry.add_set(SetEntry::new(135.0, 0, 1));
        assert_eq!(
            entry.validate(),
            vec!["Set 2 is invalid: Reps must be greater than 0"]
        );
    }

    #[test]
    fn test_from_exercise_snapshots_name() {
        let mut exercise = Exercise::new("Deadlift", ExerciseCategory::Strength);
        exercise.id = 7;
        let entry = WorkoutExercise::from_exercise(&exercise, vec![SetEntry::new(225.0, 5, 1)]);

        exercise.name = "Conventional Deadlift".into();
        assert_eq!(entry.exercise_id, 7);
        assert_eq!(entry.exercise_name, "Deadlift");
    }

    #[test]
    fn test_workout_validation_prefixes_position() {
        let mut workout = Workout::new(date());
        assert!(workout.is_valid());
        assert!(workout.is_empty());

        workout.add_exercise(bench());
        workout.add_exercise(WorkoutExercise::new(2, "Row", vec![]));
        assert_eq!(
            workout.validate(),
            vec!["Exercise 2: At least one set is required"]
        );
    }

    #[test]
    fn test_exercise_list_management() {
        let mut workout = Workout::new(date());
        workout.add_exercise(bench());
        workout.add_exercise(WorkoutExercise::new(2, "Row", vec![SetEntry::new(95.0, 12, 2)]));

        assert_eq!(workout.total_sets(), 5);
        assert_eq!(workout.total_volume(), 135.0 * 30.0 + 95.0 * 24.0);

        assert!(workout.remove_exercise(5).is_none());
        let removed = workout.remove_exercise(0).unwrap();
        assert_eq!(removed.exercise_name, "Bench Press");
        assert_eq!(workout.exercises.len(), 1);

        workout.clear_exercises();
        assert!(workout.is_empty());
    }

    #[test]
    fn test_set_list_management() {
        let mut entry = bench();
        entry.add_set(SetEntry::new(155.0, 6, 2));
        assert_eq!(entry.max_weight(), 155.0);
        assert_eq!(entry.total_sets(), 5);

        assert!(entry.remove_set(9).is_none());
        assert_eq!(entry.remove_set(1), Some(SetEntry::new(155.0, 6, 2)));
        entry.clear_sets();
        assert_eq!(entry.max_weight(), 0.0);
    }
}
