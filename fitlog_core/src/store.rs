//! The record store.
//!
//! Owns every body-composition entry, exercise and workout in memory, backed
//! by a single JSON document that is rewritten in full after each mutation.
//!
//! Failure semantics:
//! - Validation failures reject the call before anything changes.
//! - A failed flush leaves the in-memory change applied and returns the
//!   error; call `save_data` again to retry.
//! - Subscribers hear about a change only once it is both applied and
//!   flushed.

use crate::document::{
    BodyCompositionRecord, DataDocument, ExerciseRecord, LoadedData, WorkoutRecord,
};
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier, RecordKey, SubscriptionId};
use crate::{BodyComposition, Error, Exercise, ExerciseCategory, Result, Workout};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Outcome of reading the data file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No file yet; the store starts empty
    Fresh,
    /// File read; `skipped` records could not be converted and were dropped
    Loaded { skipped: usize },
    /// File present but unreadable or malformed; the store starts empty
    Failed(String),
}

impl LoadStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadStatus::Failed(_))
    }
}

/// In-memory record collections plus their backing file
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    body_composition: HashMap<NaiveDate, BodyComposition>,
    exercises: HashMap<u32, Exercise>,
    workouts: HashMap<u32, Workout>,
    notifier: ChangeNotifier,
    load_status: LoadStatus,
}

impl RecordStore {
    /// Open the store backed by `path`, loading it if it exists
    ///
    /// Never fails: a corrupt file is reported through `load_status` and the
    /// store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            body_composition: HashMap::new(),
            exercises: HashMap::new(),
            workouts: HashMap::new(),
            notifier: ChangeNotifier::default(),
            load_status: LoadStatus::Fresh,
        };

        if let Err(e) = store.ensure_data_dir() {
            tracing::warn!("Unable to create data directory for {:?}: {}", store.path, e);
        }
        // Failure is recorded in load_status
        let _ = store.reload();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Re-read the data file, replacing all in-memory state
    ///
    /// On failure the store is left empty and the error is returned as well
    /// as recorded in `load_status`.
    pub fn reload(&mut self) -> Result<()> {
        self.body_composition.clear();
        self.exercises.clear();
        self.workouts.clear();

        match DataDocument::load(&self.path) {
            Ok(None) => {
                self.load_status = LoadStatus::Fresh;
                Ok(())
            }
            Ok(Some(loaded)) => {
                let skipped = loaded.skipped;
                self.install(loaded);
                tracing::info!(
                    "Loaded {} body composition entries, {} exercises, {} workouts from {:?}",
                    self.body_composition.len(),
                    self.exercises.len(),
                    self.workouts.len(),
                    self.path
                );
                self.load_status = LoadStatus::Loaded { skipped };
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load data file {:?}: {}. Starting empty.", self.path, e);
                self.load_status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn install(&mut self, loaded: LoadedData) {
        for entry in loaded.body_composition {
            self.body_composition.insert(entry.date(), entry);
        }
        for exercise in loaded.exercises {
            self.exercises.insert(exercise.id, exercise);
        }
        for workout in loaded.workouts {
            self.workouts.insert(workout.id, workout);
        }
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write all three collections to the data file
    pub fn save_data(&self) -> Result<()> {
        let document = DataDocument {
            body_composition: self
                .all_body_composition_sorted()
                .iter()
                .map(BodyCompositionRecord::from)
                .collect(),
            exercises: self.all_exercises().iter().map(ExerciseRecord::from).collect(),
            workouts: self.all_workouts().iter().map(WorkoutRecord::from).collect(),
        };

        document.save(&self.path).map_err(|e| {
            tracing::warn!("Failed to write data file {:?}: {}", self.path, e);
            e
        })
    }

    /// Flush, then tell subscribers
    fn commit(&mut self, kind: ChangeKind, key: RecordKey) -> Result<()> {
        self.save_data()?;
        self.notifier.notify(ChangeEvent { kind, key });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Body composition
    // ------------------------------------------------------------------

    /// Insert or overwrite the entry for its date
    pub fn save_body_composition(&mut self, mut entry: BodyComposition) -> Result<()> {
        let errors = entry.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        entry.touch();
        let date = entry.date();
        self.body_composition.insert(date, entry);
        tracing::debug!("Saved body composition for {}", date);
        self.commit(ChangeKind::Saved, RecordKey::BodyComposition(date))
    }

    pub fn load_body_composition(&self, date: NaiveDate) -> Option<BodyComposition> {
        self.body_composition.get(&date).cloned()
    }

    pub fn has_body_composition(&self, date: NaiveDate) -> bool {
        self.body_composition.contains_key(&date)
    }

    /// Returns `Ok(false)` without writing if there is no entry for `date`
    pub fn delete_body_composition(&mut self, date: NaiveDate) -> Result<bool> {
        if self.body_composition.remove(&date).is_none() {
            return Ok(false);
        }
        self.commit(ChangeKind::Deleted, RecordKey::BodyComposition(date))?;
        Ok(true)
    }

    /// All dates with an entry, ascending
    pub fn body_composition_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self.body_composition.keys().copied().collect();
        dates.sort_unstable();
        dates
    }

    /// Entries with `start <= date <= end`, ascending by date
    pub fn body_composition_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<BodyComposition> {
        let mut entries: Vec<_> = self
            .body_composition
            .values()
            .filter(|e| e.date() >= start && e.date() <= end)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date());
        entries
    }

    pub fn all_body_composition_sorted(&self) -> Vec<BodyComposition> {
        let mut entries: Vec<_> = self.body_composition.values().cloned().collect();
        entries.sort_by_key(|e| e.date());
        entries
    }

    /// Lightest and heaviest positive weight on record
    pub fn weight_range(&self) -> Option<(f64, f64)> {
        self.body_composition
            .values()
            .map(BodyComposition::weight)
            .filter(|w| *w > 0.0)
            .fold(None, |range, w| match range {
                None => Some((w, w)),
                Some((min, max)) => Some((f64::min(min, w), f64::max(max, w))),
            })
    }

    /// Earliest and latest date with an entry
    pub fn data_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.body_composition.keys().min()?;
        let max = self.body_composition.keys().max()?;
        Some((*min, *max))
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    /// Insert or overwrite an exercise, returning its id
    ///
    /// An id of 0 gets the next free id (`max + 1`).
    pub fn save_exercise(&mut self, mut exercise: Exercise) -> Result<u32> {
        let errors = exercise.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        if exercise.id == 0 {
            exercise.id = self.next_exercise_id()?;
        }
        exercise.updated_at = Utc::now();

        let id = exercise.id;
        self.exercises.insert(id, exercise);
        tracing::debug!("Saved exercise {}", id);
        self.commit(ChangeKind::Saved, RecordKey::Exercise(id))?;
        Ok(id)
    }

    pub fn load_exercise(&self, id: u32) -> Option<Exercise> {
        self.exercises.get(&id).cloned()
    }

    /// All exercises, ascending by id
    pub fn all_exercises(&self) -> Vec<Exercise> {
        let mut exercises: Vec<_> = self.exercises.values().cloned().collect();
        exercises.sort_by_key(|e| e.id);
        exercises
    }

    /// Active exercises in `category`, ascending by id
    pub fn exercises_by_category(&self, category: &ExerciseCategory) -> Vec<Exercise> {
        let mut exercises: Vec<_> = self
            .exercises
            .values()
            .filter(|e| e.is_active && &e.category == category)
            .cloned()
            .collect();
        exercises.sort_by_key(|e| e.id);
        exercises
    }

    /// Workouts keep their name snapshot; nothing cascades
    pub fn delete_exercise(&mut self, id: u32) -> Result<bool> {
        if self.exercises.remove(&id).is_none() {
            return Ok(false);
        }
        self.commit(ChangeKind::Deleted, RecordKey::Exercise(id))?;
        Ok(true)
    }

    /// Fails once `u32::MAX` is taken
    pub fn next_exercise_id(&self) -> Result<u32> {
        self.exercises
            .keys()
            .max()
            .map_or(Ok(1), |max| id_after(*max, "exercise"))
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    /// Insert or overwrite a workout, returning its id
    ///
    /// Each exercise entry is stamped with the workout id, and entries
    /// without an id get the next one within the workout.
    pub fn save_workout(&mut self, mut workout: Workout) -> Result<u32> {
        let errors = workout.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        if workout.id == 0 {
            workout.id = self.next_workout_id()?;
        }
        let now = Utc::now();
        workout.updated_at = now;

        let mut last_entry_id = workout.exercises.iter().map(|e| e.id).max().unwrap_or(0);
        for entry in &mut workout.exercises {
            entry.workout_id = workout.id;
            if entry.id == 0 {
                last_entry_id = id_after(last_entry_id, "workout entry")?;
                entry.id = last_entry_id;
            }
        }

        let id = workout.id;
        self.workouts.insert(id, workout);
        tracing::debug!("Saved workout {}", id);
        self.commit(ChangeKind::Saved, RecordKey::Workout(id))?;
        Ok(id)
    }

    pub fn load_workout(&self, id: u32) -> Option<Workout> {
        self.workouts.get(&id).cloned()
    }

    /// All workouts, ascending by date then id
    pub fn all_workouts(&self) -> Vec<Workout> {
        let mut workouts: Vec<_> = self.workouts.values().cloned().collect();
        workouts.sort_by_key(|w| (w.date, w.id));
        workouts
    }

    /// Every workout logged on `date`, ascending by id
    pub fn workouts_by_date(&self, date: NaiveDate) -> Vec<Workout> {
        let mut workouts: Vec<_> = self
            .workouts
            .values()
            .filter(|w| w.date == date)
            .cloned()
            .collect();
        workouts.sort_by_key(|w| w.id);
        workouts
    }

    pub fn delete_workout(&mut self, id: u32) -> Result<bool> {
        if self.workouts.remove(&id).is_none() {
            return Ok(false);
        }
        self.commit(ChangeKind::Deleted, RecordKey::Workout(id))?;
        Ok(true)
    }

    /// Fails once `u32::MAX` is taken
    pub fn next_workout_id(&self) -> Result<u32> {
        self.workouts
            .keys()
            .max()
            .map_or(Ok(1), |max| id_after(*max, "workout"))
    }
}

fn id_after(id: u32, kind: &str) -> Result<u32> {
    id.checked_add(1)
        .ok_or_else(|| Error::Other(format!("{} id space exhausted", kind)))
}
