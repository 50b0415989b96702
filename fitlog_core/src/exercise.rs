//! Exercise library entries.

use chrono::{DateTime, Utc};
use std::fmt;

const MAX_NAME_LEN: usize = 255;

/// Exercise category tag
///
/// The library offers three categories. `Other` keeps whatever tag an older
/// data file carried so it survives a load/save cycle untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExerciseCategory {
    Strength,
    Cardio,
    Flexibility,
    Other(String),
}

impl ExerciseCategory {
    pub const ALL: [ExerciseCategory; 3] = [
        ExerciseCategory::Strength,
        ExerciseCategory::Cardio,
        ExerciseCategory::Flexibility,
    ];

    /// Parse a category tag, case-insensitively for the known ones
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strength" => ExerciseCategory::Strength,
            "cardio" => ExerciseCategory::Cardio,
            "flexibility" => ExerciseCategory::Flexibility,
            _ => ExerciseCategory::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::Flexibility => "flexibility",
            ExerciseCategory::Other(s) => s,
        }
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A named exercise in the user's library
///
/// `id` 0 means "not yet stored"; the record store assigns the real id.
#[derive(Clone, Debug, PartialEq)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    pub category: ExerciseCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: ExerciseCategory) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            category,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Exercise name cannot be empty".to_string());
        } else if self.name.chars().count() > MAX_NAME_LEN {
            errors.push(format!(
                "Exercise name is too long (max {} characters)",
                MAX_NAME_LEN
            ));
        }

        if self.category.as_str().trim().is_empty() {
            errors.push("Exercise category cannot be empty".to_string());
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
    use rstest::rstest;

    #[rstest]
    #[case("strength", ExerciseCategory::Strength)]
    #[case("Cardio", ExerciseCategory::Cardio)]
    #[case(" FLEXIBILITY ", ExerciseCategory::Flexibility)]
    #[case("plyometrics", ExerciseCategory::Other("plyometrics".into()))]
    fn test_parse_category(#[case] input: &str, #[case] expected: ExerciseCategory) {
        assert_eq!(ExerciseCategory::parse(input), expected);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in ExerciseCategory::ALL {
            assert_eq!(ExerciseCategory::parse(category.as_str()), category);
        }
        assert_eq!(ExerciseCategory::Other("yoga".into()).to_string(), "yoga");
    }

    #[test]
    fn test_new_exercise_is_valid_and_unassigned() {
        let ex = Exercise::new("Squat", ExerciseCategory::Strength);
        assert_eq!(ex.id, 0);
        assert!(ex.is_active);
        assert!(ex.is_valid());
    }

    #[test]
    fn test_blank_name_and_category_rejected() {
        let ex = Exercise::new("   ", ExerciseCategory::Other(String::new()));
        assert_eq!(
            ex.validate(),
            vec![
                "Exercise name cannot be empty".to_string(),
                "Exercise category cannot be empty".to_string(),
            ]
        );
    }

    #[test]
    fn test_name_length_limit() {
        let ok = Exercise::new("a".repeat(255), ExerciseCategory::Cardio);
        assert!(ok.is_valid());

        let long = Exercise::new("a".repeat(256), ExerciseCategory::Cardio);
        assert_eq!(
            long.validate(),
            vec!["Exercise name is too long (max 255 characters)".to_string()]
        );
    }
}
