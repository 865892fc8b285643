use std::collections::HashSet;

use super::bands::EPSILON;
use super::config::GradingScale;
use super::types::ExamType;

/// Widest allowed distance between one band's upper edge and the next band's
/// lower edge. Percentages are graded at two decimals.
const MAX_BAND_STEP: f64 = 0.01;

/// Validate grading bands at startup.
/// Returns all validation errors at once (not just the first).
///
/// Every exam type that has bands must cover `[0, 100]` exactly once: no
/// overlaps and no gaps wider than 0.01.
pub fn validate_grading(scale: &GradingScale) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, band) in scale.bands.iter().enumerate() {
        let name = if band.grade_name.trim().is_empty() {
            errors.push(format!("grading[{}].grade_name: must not be empty", i));
            "?"
        } else {
            band.grade_name.as_str()
        };
        if !band.percent_from.is_finite() || !band.percent_upto.is_finite() {
            errors.push(format!("grading[{}] ({}): bounds must be finite numbers", i, name));
            continue;
        }
        if band.percent_from < 0.0 || band.percent_upto > 100.0 {
            errors.push(format!(
                "grading[{}] ({}): bounds {}-{} must lie within 0-100",
                i, name, band.percent_from, band.percent_upto
            ));
        }
        if band.percent_from > band.percent_upto {
            errors.push(format!(
                "grading[{}] ({}): percent_from {} is greater than percent_upto {}",
                i, name, band.percent_from, band.percent_upto
            ));
        }
        if let Some(point) = band.grade_point {
            if point < 0.0 {
                errors.push(format!("grading[{}] ({}): grade_point must be non-negative", i, name));
            }
        }
    }

    for exam_type in ExamType::ALL {
        let bands = scale.bands_for(exam_type);
        if bands.is_empty() {
            continue;
        }

        let mut seen = HashSet::new();
        for band in &bands {
            if !seen.insert(band.grade_name.as_str()) {
                errors.push(format!(
                    "grading.{}: duplicate grade '{}'",
                    exam_type, band.grade_name
                ));
            }
        }

        let first = bands[0];
        if first.percent_from > EPSILON {
            errors.push(format!(
                "grading.{}: coverage starts at {} instead of 0",
                exam_type, first.percent_from
            ));
        }
        let last_upto = bands
            .iter()
            .map(|b| b.percent_upto)
            .fold(f64::MIN, f64::max);
        if last_upto < 100.0 - EPSILON {
            errors.push(format!(
                "grading.{}: coverage ends at {} instead of 100",
                exam_type, last_upto
            ));
        }

        for pair in bands.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.percent_from <= prev.percent_upto + EPSILON {
                errors.push(format!(
                    "grading.{}: '{}' ({}-{}) overlaps '{}' ({}-{})",
                    exam_type,
                    prev.grade_name,
                    prev.percent_from,
                    prev.percent_upto,
                    next.grade_name,
                    next.percent_from,
                    next.percent_upto
                ));
            } else if next.percent_from - prev.percent_upto > MAX_BAND_STEP + EPSILON {
                errors.push(format!(
                    "grading.{}: gap between '{}' (ends {}) and '{}' (starts {})",
                    exam_type, prev.grade_name, prev.percent_upto, next.grade_name, next.percent_from
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::GradeBand;

    fn band(name: &str, from: f64, upto: f64) -> GradeBand {
        GradeBand::new(ExamType::SchoolBased, name, from, upto)
    }

    #[test]
    fn test_default_scale_valid() {
        assert!(validate_grading(&GradingScale::default()).is_ok());
    }

    #[test]
    fn test_empty_scale_valid() {
        assert!(validate_grading(&GradingScale::new(vec![])).is_ok());
    }

    #[test]
    fn test_overlap_detected() {
        let scale = GradingScale::new(vec![band("A", 80.0, 100.0), band("F", 0.0, 80.0)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("overlaps"));
    }

    #[test]
    fn test_gap_detected() {
        let scale = GradingScale::new(vec![band("A", 80.0, 100.0), band("F", 0.0, 79.0)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("gap"));
    }

    #[test]
    fn test_hundredth_step_is_not_a_gap() {
        let scale = GradingScale::new(vec![band("A", 90.0, 100.0), band("B", 0.0, 89.99)]);
        assert!(validate_grading(&scale).is_ok());
    }

    #[test]
    fn test_incomplete_coverage() {
        let scale = GradingScale::new(vec![band("A", 10.0, 95.0)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("starts at 10")));
        assert!(errors.iter().any(|e| e.contains("ends at 95")));
    }

    #[test]
    fn test_inverted_band() {
        let scale = GradingScale::new(vec![band("A", 0.0, 100.0), band("X", 60.0, 50.0)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("grading[1] (X): percent_from")));
    }

    #[test]
    fn test_duplicate_grade_name() {
        let scale = GradingScale::new(vec![band("A", 50.0, 100.0), band("A", 0.0, 49.99)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert!(errors[0].contains("duplicate grade 'A'"));
    }

    #[test]
    fn test_negative_grade_point() {
        let scale = GradingScale::new(vec![band("A", 0.0, 100.0).with_point(-1.0)]);
        let errors = validate_grading(&scale).unwrap_err();
        assert!(errors[0].contains("grade_point"));
    }

    #[test]
    fn test_exam_types_checked_independently() {
        let scale = GradingScale::new(vec![
            band("A", 0.0, 100.0),
            GradeBand::new(ExamType::Gpa, "A", 0.0, 100.0),
        ]);
        assert!(validate_grading(&scale).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let scale = GradingScale::new(vec![
            band("A", 80.0, 120.0),  // Error 1: out of range
            band("B", 0.0, 70.0),    // Error 2: gap to A
        ]);
        let errors = validate_grading(&scale).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
