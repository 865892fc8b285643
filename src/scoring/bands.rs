use super::config::{GradeBand, GradingScale};
use super::error::{ScoringError, ScoringResult};
use super::types::{round2, ExamType};

// Tolerance for float comparisons on band edges.
pub(crate) const EPSILON: f64 = 1e-9;

impl GradeBand {
    /// Whether a percentage (already rounded to two decimals) falls in this band
    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.percent_from - EPSILON && percentage <= self.percent_upto + EPSILON
    }
}

/// Resolve the grade band for a percentage.
///
/// Returns `Ok(None)` when the exam type has no bands configured at all.
/// A configured scale must match exactly one band; no match or several
/// matches is an error.
pub fn lookup_grade(
    scale: &GradingScale,
    exam_type: ExamType,
    percentage: f64,
) -> ScoringResult<Option<GradeBand>> {
    let bands = scale.bands_for(exam_type);
    if bands.is_empty() {
        return Ok(None);
    }

    let rounded = round2(percentage);
    let matches: Vec<&GradeBand> = bands.into_iter().filter(|b| b.contains(rounded)).collect();

    match matches.as_slice() {
        [] => Err(ScoringError::NoGradeBand {
            exam_type,
            percentage,
        }),
        [band] => Ok(Some((*band).clone())),
        many => Err(ScoringError::AmbiguousGradeBand {
            exam_type,
            percentage,
            grades: many.iter().map(|b| b.grade_name.clone()).collect(),
        }),
    }
}
