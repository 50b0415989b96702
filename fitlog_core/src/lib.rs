#![forbid(unsafe_code)]

//! Core domain model and record store for fitlog.
//!
//! This crate provides:
//! - Domain entities (body composition, exercises, workouts, sets)
//! - BMI and body-fat category calculations
//! - The record store with its JSON document persistence
//! - Change notification for presentation code
//! - Summaries and CSV export

pub mod body_composition;
pub mod exercise;
pub mod workout;
pub mod calculations;
pub mod error;
pub mod config;
pub mod logging;
pub mod document;
pub mod notify;
pub mod store;
pub mod summary;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use body_composition::{BodyComposition, Measurements, Sex};
pub use exercise::{Exercise, ExerciseCategory};
pub use workout::{SetEntry, Workout, WorkoutExercise, WorkoutStatus};
pub use config::Config;
pub use notify::{ChangeEvent, ChangeKind, RecordKey, SubscriptionId};
pub use store::{LoadStatus, RecordStore};
pub use csv_export::export_body_composition_csv;
