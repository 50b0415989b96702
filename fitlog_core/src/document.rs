//! On-disk data document.
//!
//! The whole store lives in one JSON object with three arrays:
//! `bodyComposition`, `exercises` and `workouts`. Each array element is read
//! through a wire record that defaults every missing field, then converted
//! into the domain type. Saving goes the other way and rewrites the whole
//! file atomically.

use crate::{
    BodyComposition, Error, Exercise, ExerciseCategory, Measurements, Result, SetEntry, Sex,
    Workout, WorkoutExercise, WorkoutStatus,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// The top-level JSON object
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDocument {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub body_composition: Vec<BodyCompositionRecord>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub exercises: Vec<ExerciseRecord>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub workouts: Vec<WorkoutRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCompositionRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub waist_circumference: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub neck_circumference: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bmi: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub body_fat_percentage: f64,
    #[serde(default = "default_true", deserialize_with = "lenient_bool_true")]
    pub is_male: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default = "default_true", deserialize_with = "lenient_bool_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub exercises: Vec<WorkoutExerciseRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub workout_id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub exercise_id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub exercise_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sets_data: Vec<SetRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetRecord {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub reps: i64,
    #[serde(default = "default_sets", deserialize_with = "lenient_sets")]
    pub sets: i64,
}

fn default_true() -> bool {
    true
}

fn default_sets() -> i64 {
    1
}

// Field readers below never fail: a null or wrongly typed value falls back to
// the field's default, so one bad field cannot sink the whole document.

fn lenient_value<'de, D>(deserializer: D) -> std::result::Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null))
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_value(deserializer)?.as_f64().unwrap_or(0.0))
}

fn as_int(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_int(&lenient_value(deserializer)?).unwrap_or(0))
}

fn lenient_sets<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_int(&lenient_value(deserializer)?).unwrap_or_else(default_sets))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_value(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_bool_true<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_value(deserializer)?.as_bool().unwrap_or(true))
}

/// A non-array becomes empty; elements that are not records are dropped
fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match lenient_value(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!("Expected an array, found {}; ignoring it", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect())
}

/// Accept RFC 3339 or an offset-less `YYYY-MM-DDTHH:MM:SS`; fall back to now
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match lenient_value(deserializer)? {
        Value::String(s) => parse_timestamp(&s),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Negative or oversized counts become 0 so validation flags them
fn to_count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Ids must be positive to be kept
fn to_id(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|id| *id > 0)
}

impl TryFrom<BodyCompositionRecord> for BodyComposition {
    type Error = Error;

    fn try_from(record: BodyCompositionRecord) -> Result<Self> {
        let date = parse_date(&record.date)
            .ok_or_else(|| Error::Other(format!("Invalid date: {:?}", record.date)))?;

        // Stored bmi/bodyFatPercentage are ignored; they are recomputed
        Ok(BodyComposition::with_timestamp(
            date,
            Measurements {
                weight: record.weight,
                waist: record.waist_circumference,
                height: record.height,
                neck: record.neck_circumference,
            },
            Sex::from_is_male(record.is_male),
            record.notes,
            record.timestamp,
        ))
    }
}

impl From<&BodyComposition> for BodyCompositionRecord {
    fn from(entry: &BodyComposition) -> Self {
        BodyCompositionRecord {
            date: format_date(entry.date()),
            weight: entry.weight(),
            waist_circumference: entry.waist(),
            height: entry.height(),
            neck_circumference: entry.neck(),
            notes: entry.notes().to_string(),
            timestamp: entry.timestamp(),
            bmi: entry.bmi(),
            body_fat_percentage: entry.body_fat_percentage(),
            is_male: entry.sex().is_male(),
        }
    }
}

impl TryFrom<ExerciseRecord> for Exercise {
    type Error = Error;

    fn try_from(record: ExerciseRecord) -> Result<Self> {
        let id = to_id(record.id)
            .ok_or_else(|| Error::Other(format!("Invalid exercise id: {}", record.id)))?;

        Ok(Exercise {
            id,
            name: record.name,
            category: ExerciseCategory::parse(&record.category),
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<&Exercise> for ExerciseRecord {
    fn from(exercise: &Exercise) -> Self {
        ExerciseRecord {
            id: i64::from(exercise.id),
            name: exercise.name.clone(),
            category: exercise.category.as_str().to_string(),
            is_active: exercise.is_active,
            created_at: exercise.created_at,
            updated_at: exercise.updated_at,
        }
    }
}

impl From<SetRecord> for SetEntry {
    fn from(record: SetRecord) -> Self {
        SetEntry {
            weight: record.weight,
            reps: to_count(record.reps),
            sets: to_count(record.sets),
        }
    }
}

impl From<&SetEntry> for SetRecord {
    fn from(set: &SetEntry) -> Self {
        SetRecord {
            weight: set.weight,
            reps: i64::from(set.reps),
            sets: i64::from(set.sets),
        }
    }
}

impl From<WorkoutExerciseRecord> for WorkoutExercise {
    fn from(record: WorkoutExerciseRecord) -> Self {
        WorkoutExercise {
            id: to_count(record.id),
            workout_id: to_count(record.workout_id),
            exercise_id: to_count(record.exercise_id),
            exercise_name: record.exercise_name,
            sets: record.sets_data.into_iter().map(SetEntry::from).collect(),
            notes: record.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&WorkoutExercise> for WorkoutExerciseRecord {
    fn from(entry: &WorkoutExercise) -> Self {
        WorkoutExerciseRecord {
            id: i64::from(entry.id),
            workout_id: i64::from(entry.workout_id),
            exercise_id: i64::from(entry.exercise_id),
            exercise_name: entry.exercise_name.clone(),
            notes: entry.notes.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            sets_data: entry.sets.iter().map(SetRecord::from).collect(),
        }
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = Error;

    fn try_from(record: WorkoutRecord) -> Result<Self> {
        let id = to_id(record.id)
            .ok_or_else(|| Error::Other(format!("Invalid workout id: {}", record.id)))?;
        let date = parse_date(&record.date)
            .ok_or_else(|| Error::Other(format!("Invalid workout date: {:?}", record.date)))?;

        Ok(Workout {
            id,
            date,
            notes: record.notes,
            status: WorkoutStatus::parse(&record.status),
            exercises: record
                .exercises
                .into_iter()
                .map(WorkoutExercise::from)
                .collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        WorkoutRecord {
            id: i64::from(workout.id),
            date: format_date(workout.date),
            notes: workout.notes.clone(),
            status: workout.status.as_str().to_string(),
            created_at: workout.created_at,
            updated_at: workout.updated_at,
            exercises: workout
                .exercises
                .iter()
                .map(WorkoutExerciseRecord::from)
                .collect(),
        }
    }
}

/// Parsed collections, with records that could not be converted dropped
#[derive(Debug, Default)]
pub struct LoadedData {
    pub body_composition: Vec<BodyComposition>,
    pub exercises: Vec<Exercise>,
    pub workouts: Vec<Workout>,
    pub skipped: usize,
}

impl DataDocument {
    /// Read the document at `path`
    ///
    /// Returns `Ok(None)` if the file does not exist. Malformed JSON is an
    /// error; individual records that fail conversion are skipped and
    /// counted instead.
    pub fn load(path: &Path) -> Result<Option<LoadedData>> {
        if !path.exists() {
            tracing::info!("No data file at {:?}, starting empty", path);
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let document: DataDocument = serde_json::from_str(&contents)?;
        Ok(Some(document.into_loaded()))
    }

    pub fn into_loaded(self) -> LoadedData {
        let mut loaded = LoadedData::default();

        for record in self.body_composition {
            match BodyComposition::try_from(record) {
                Ok(entry) => loaded.body_composition.push(entry),
                Err(e) => {
                    tracing::warn!("Skipping body composition entry: {}", e);
                    loaded.skipped += 1;
                }
            }
        }

        for record in self.exercises {
            match Exercise::try_from(record) {
                Ok(exercise) => loaded.exercises.push(exercise),
                Err(e) => {
                    tracing::warn!("Skipping exercise: {}", e);
                    loaded.skipped += 1;
                }
            }
        }

        for record in self.workouts {
            match Workout::try_from(record) {
                Ok(workout) => loaded.workouts.push(workout),
                Err(e) => {
                    tracing::warn!("Skipping workout: {}", e);
                    loaded.skipped += 1;
                }
            }
        }

        loaded
    }

    /// Write the document to `path`
    ///
    /// Writes to a temp file in the same directory under an exclusive lock,
    /// syncs it, then renames it over the target so a crash mid-write never
    /// leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved data document to {:?}", path);
        Ok(())
    }
}
