//! Daily body-composition measurements.
//!
//! A `BodyComposition` is keyed by calendar date. BMI and body-fat
//! percentage are derived from the raw measurements and recomputed on every
//! change, so they can never drift from the numbers they were computed from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const LBS_TO_KG: f64 = 0.453592;
const INCHES_TO_METERS: f64 = 0.0254;

const MAX_WEIGHT: f64 = 1000.0;
const MAX_WAIST: f64 = 200.0;
const MAX_HEIGHT: f64 = 300.0;
const MAX_NECK: f64 = 100.0;

/// Upper bound of a plausible body-fat estimate
const MAX_BODY_FAT: f64 = 50.0;

/// Biological sex, used to pick body-fat formulas and category thresholds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn from_is_male(is_male: bool) -> Self {
        if is_male {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn is_male(self) -> bool {
        self == Sex::Male
    }
}

/// Raw measurements as entered by the user (lbs and inches)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurements {
    pub weight: f64,
    pub waist: f64,
    pub height: f64,
    pub neck: f64,
}

/// One day's body-composition entry
#[derive(Clone, Debug, PartialEq)]
pub struct BodyComposition {
    date: NaiveDate,
    measurements: Measurements,
    notes: String,
    sex: Sex,
    timestamp: DateTime<Utc>,
    bmi: f64,
    body_fat_percentage: f64,
}

impl BodyComposition {
    pub fn new(date: NaiveDate, measurements: Measurements, sex: Sex) -> Self {
        Self::with_timestamp(date, measurements, sex, String::new(), Utc::now())
    }

    /// Build an entry with an explicit save timestamp (used when loading)
    pub fn with_timestamp(
        date: NaiveDate,
        measurements: Measurements,
        sex: Sex,
        notes: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut entry = Self {
            date,
            measurements,
            notes,
            sex,
            timestamp,
            bmi: 0.0,
            body_fat_percentage: 0.0,
        };
        entry.recompute();
        entry
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn measurements(&self) -> Measurements {
        self.measurements
    }

    pub fn weight(&self) -> f64 {
        self.measurements.weight
    }

    pub fn waist(&self) -> f64 {
        self.measurements.waist
    }

    pub fn height(&self) -> f64 {
        self.measurements.height
    }

    pub fn neck(&self) -> f64 {
        self.measurements.neck
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn body_fat_percentage(&self) -> f64 {
        self.body_fat_percentage
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn set_measurements(&mut self, measurements: Measurements) {
        self.measurements = measurements;
        self.recompute();
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.measurements.weight = weight;
        self.recompute();
    }

    pub fn set_waist(&mut self, waist: f64) {
        self.measurements.waist = waist;
        self.recompute();
    }

    pub fn set_height(&mut self, height: f64) {
        self.measurements.height = height;
        self.recompute();
    }

    pub fn set_neck(&mut self, neck: f64) {
        self.measurements.neck = neck;
        self.recompute();
    }

    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
        self.recompute();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Stamp the entry with the current time; the store calls this on save.
    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }

    /// Human-readable violations; empty when the entry can be stored
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let m = &self.measurements;

        check_range(&mut errors, "Weight", m.weight, MAX_WEIGHT);
        check_range(&mut errors, "Waist circumference", m.waist, MAX_WAIST);
        check_range(&mut errors, "Height", m.height, MAX_HEIGHT);
        check_range(&mut errors, "Neck circumference", m.neck, MAX_NECK);

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// No measurements and no notes: "nothing recorded" rather than zeros
    pub fn is_empty(&self) -> bool {
        let m = &self.measurements;
        m.weight <= 0.0
            && m.waist <= 0.0
            && m.height <= 0.0
            && m.neck <= 0.0
            && self.notes.trim().is_empty()
    }

    fn recompute(&mut self) {
        self.bmi = calculate_bmi(self.measurements.weight, self.measurements.height);
        self.body_fat_percentage = calculate_body_fat(&self.measurements, self.sex);
    }
}

fn check_range(errors: &mut Vec<String>, label: &str, value: f64, max: f64) {
    if value.is_nan() || value <= 0.0 {
        errors.push(format!("{} must be greater than 0", label));
    } else if value > max {
        errors.push(format!("{} seems unrealistic (over {})", label, max));
    }
}

/// BMI from weight in pounds and height in inches; 0 when not computable
pub fn calculate_bmi(weight_lbs: f64, height_in: f64) -> f64 {
    if height_in <= 0.0 || weight_lbs <= 0.0 {
        return 0.0;
    }

    let height_m = height_in * INCHES_TO_METERS;
    let weight_kg = weight_lbs * LBS_TO_KG;
    weight_kg / (height_m * height_m)
}

/// U.S. Navy body-fat estimate in percent; 0 when not computable
///
/// Only the male formula is supported. The female formula needs a hip
/// measurement that is not recorded, so females always get 0.
pub fn calculate_body_fat(m: &Measurements, sex: Sex) -> f64 {
    if m.waist <= 0.0 || m.neck <= 0.0 || m.height <= 0.0 || m.waist <= m.neck {
        return 0.0;
    }

    match sex {
        Sex::Male => {
            let body_fat =
                86.010 * (m.waist - m.neck).log10() - 70.041 * m.height.log10() + 36.76;
            if (0.0..=MAX_BODY_FAT).contains(&body_fat) {
                body_fat
            } else {
                0.0
            }
        }
        Sex::Female => 0.0,
    }
}
