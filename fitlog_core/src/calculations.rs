//! Category labels and display colors for BMI and body-fat values.
//!
//! Pure functions only; presentation code uses these to label and tint the
//! derived metrics of a `BodyComposition`.

use crate::Sex;

pub const UNDERWEIGHT: &str = "Underweight";
pub const NORMAL_WEIGHT: &str = "Normal weight";
pub const OVERWEIGHT: &str = "Overweight";
pub const OBESE: &str = "Obese";

pub const ESSENTIAL_FAT: &str = "Essential fat";
pub const ATHLETE: &str = "Athlete";
pub const FITNESS: &str = "Fitness";
pub const AVERAGE: &str = "Average";

const RED: &str = "#dc3545";
const ORANGE: &str = "#fd7e14";
const GREEN: &str = "#28a745";
const BLUE: &str = "#007bff";
const DEFAULT_COLOR: &str = "#333";

const NOT_AVAILABLE: &str = "Not available";

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        UNDERWEIGHT
    } else if bmi < 25.0 {
        NORMAL_WEIGHT
    } else if bmi < 30.0 {
        OVERWEIGHT
    } else {
        OBESE
    }
}

pub fn body_fat_category(body_fat: f64, sex: Sex) -> &'static str {
    // Upper bounds for essential, athlete, fitness, average
    let thresholds = match sex {
        Sex::Male => [6.0, 14.0, 18.0, 25.0],
        Sex::Female => [14.0, 21.0, 25.0, 32.0],
    };
    let labels = [ESSENTIAL_FAT, ATHLETE, FITNESS, AVERAGE];

    thresholds
        .iter()
        .zip(labels)
        .find(|(limit, _)| body_fat < **limit)
        .map(|(_, label)| label)
        .unwrap_or(OBESE)
}

pub fn bmi_category_color(category: &str) -> &'static str {
    match category {
        OBESE | UNDERWEIGHT => RED,
        OVERWEIGHT => ORANGE,
        NORMAL_WEIGHT => GREEN,
        _ => DEFAULT_COLOR,
    }
}

pub fn body_fat_category_color(category: &str) -> &'static str {
    match category {
        OBESE | ESSENTIAL_FAT => RED,
        AVERAGE => GREEN,
        FITNESS | ATHLETE => BLUE,
        _ => DEFAULT_COLOR,
    }
}

/// "25.8 (Overweight)", or "Not available" for a non-positive value
pub fn format_bmi(bmi: f64) -> String {
    if bmi <= 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1} ({})", bmi, bmi_category(bmi))
}

/// "18.1% (Average)", or "Not available" for a non-positive value
pub fn format_body_fat(body_fat: f64, sex: Sex) -> String {
    if body_fat <= 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}% ({})", body_fat, body_fat_category(body_fat, sex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, UNDERWEIGHT)]
    #[case(18.49, UNDERWEIGHT)]
    #[case(18.5, NORMAL_WEIGHT)]
    #[case(24.99, NORMAL_WEIGHT)]
    #[case(25.0, OVERWEIGHT)]
    #[case(25.8, OVERWEIGHT)]
    #[case(30.0, OBESE)]
    #[case(42.0, OBESE)]
    fn test_bmi_category(#[case] bmi: f64, #[case] expected: &str) {
        assert_eq!(bmi_category(bmi), expected);
    }

    #[rstest]
    #[case(Sex::Male, 5.9, ESSENTIAL_FAT)]
    #[case(Sex::Male, 6.0, ATHLETE)]
    #[case(Sex::Male, 14.0, FITNESS)]
    #[case(Sex::Male, 18.0, AVERAGE)]
    #[case(Sex::Male, 25.0, OBESE)]
    #[case(Sex::Female, 13.9, ESSENTIAL_FAT)]
    #[case(Sex::Female, 14.0, ATHLETE)]
    #[case(Sex::Female, 21.0, FITNESS)]
    #[case(Sex::Female, 25.0, AVERAGE)]
    #[case(Sex::Female, 32.0, OBESE)]
    fn test_body_fat_category(#[case] sex: Sex, #[case] value: f64, #[case] expected: &str) {
        assert_eq!(body_fat_category(value, sex), expected);
    }

    #[rstest]
    #[case(OBESE, "#dc3545")]
    #[case(UNDERWEIGHT, "#dc3545")]
    #[case(OVERWEIGHT, "#fd7e14")]
    #[case(NORMAL_WEIGHT, "#28a745")]
    #[case("Unknown", "#333")]
    fn test_bmi_colors(#[case] category: &str, #[case] expected: &str) {
        assert_eq!(bmi_category_color(category), expected);
    }

    #[rstest]
    #[case(OBESE, "#dc3545")]
    #[case(ESSENTIAL_FAT, "#dc3545")]
    #[case(AVERAGE, "#28a745")]
    #[case(FITNESS, "#007bff")]
    #[case(ATHLETE, "#007bff")]
    #[case("", "#333")]
    fn test_body_fat_colors(#[case] category: &str, #[case] expected: &str) {
        assert_eq!(body_fat_category_color(category), expected);
    }

    #[test]
    fn test_format_bmi() {
        assert_eq!(format_bmi(25.827), "25.8 (Overweight)");
        assert_eq!(format_bmi(0.0), "Not available");
    }

    #[test]
    fn test_format_body_fat() {
        assert_eq!(format_body_fat(17.51, Sex::Male), "17.5% (Fitness)");
        assert_eq!(format_body_fat(17.51, Sex::Female), "17.5% (Athlete)");
        assert_eq!(format_body_fat(-1.0, Sex::Male), "Not available");
    }
}
