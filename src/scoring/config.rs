use serde::{Deserialize, Serialize};

use super::types::ExamType;

/// Scoring policy configuration.
///
/// Controls how unset marks are treated and how class results are ranked.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   absent_marks: fail
///   rank_by: percentage
///   ties: shared
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringPolicy {
    /// What a subject with no entered mark does to the result (default: fail)
    #[serde(default)]
    pub absent_marks: AbsentMarkPolicy,

    /// Ranking key for class reports (default: percentage)
    #[serde(default)]
    pub rank_by: RankKey,

    /// How equal keys are ranked (default: shared)
    #[serde(default)]
    pub ties: TieBreak,
}

impl ScoringPolicy {
    pub fn ranking(&self) -> RankingPolicy {
        RankingPolicy {
            key: self.rank_by,
            ties: self.ties,
        }
    }
}

/// Treatment of a subject whose mark was never entered.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbsentMarkPolicy {
    /// Counts as 0 toward the totals and fails the subject.
    #[default]
    Fail,
    /// Drops the subject from the totals and from the pass check.
    Exclude,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
    #[default]
    Percentage,
    TotalMarks,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Equal keys share a rank and the next rank is skipped (1, 2, 2, 4).
    #[default]
    Shared,
    /// Every student gets a distinct rank in tiebreak order (1, 2, 3, 4).
    Sequential,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingPolicy {
    pub key: RankKey,
    pub ties: TieBreak,
}

/// A percentage interval mapped to a grade for one exam type.
///
/// Both ends are inclusive. Percentages are rounded to two decimals before
/// lookup, so `[75, 89.99]` followed by `[90, 100]` leaves no gap.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradeBand {
    pub exam_type: ExamType,
    pub grade_name: String,
    pub percent_from: f64,
    pub percent_upto: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_point: Option<f64>,
}

impl GradeBand {
    pub fn new(exam_type: ExamType, grade_name: &str, from: f64, upto: f64) -> Self {
        Self {
            exam_type,
            grade_name: grade_name.to_string(),
            percent_from: from,
            percent_upto: upto,
            grade_point: None,
        }
    }

    pub fn with_point(mut self, point: f64) -> Self {
        self.grade_point = Some(point);
        self
    }
}

/// All configured grade bands across exam types.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct GradingScale {
    pub bands: Vec<GradeBand>,
}

impl GradingScale {
    pub fn new(bands: Vec<GradeBand>) -> Self {
        Self { bands }
    }

    /// Bands for one exam type, ordered by `percent_from` ascending
    pub fn bands_for(&self, exam_type: ExamType) -> Vec<&GradeBand> {
        let mut bands: Vec<&GradeBand> = self
            .bands
            .iter()
            .filter(|b| b.exam_type == exam_type)
            .collect();
        bands.sort_by(|a, b| a.percent_from.total_cmp(&b.percent_from));
        bands
    }

    pub fn has_bands_for(&self, exam_type: ExamType) -> bool {
        self.bands.iter().any(|b| b.exam_type == exam_type)
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        let mut bands = Vec::new();
        for exam_type in [
            ExamType::GeneralPurpose,
            ExamType::SchoolBased,
            ExamType::CollegeBased,
        ] {
            bands.extend([
                GradeBand::new(exam_type, "A", 90.0, 100.0),
                GradeBand::new(exam_type, "B", 75.0, 89.99),
                GradeBand::new(exam_type, "C", 60.0, 74.99),
                GradeBand::new(exam_type, "D", 40.0, 59.99),
                GradeBand::new(exam_type, "F", 0.0, 39.99),
            ]);
        }
        bands.extend([
            GradeBand::new(ExamType::Gpa, "A+", 90.0, 100.0).with_point(4.0),
            GradeBand::new(ExamType::Gpa, "A", 80.0, 89.99).with_point(3.7),
            GradeBand::new(ExamType::Gpa, "B", 70.0, 79.99).with_point(3.0),
            GradeBand::new(ExamType::Gpa, "C", 60.0, 69.99).with_point(2.0),
            GradeBand::new(ExamType::Gpa, "D", 40.0, 59.99).with_point(1.0),
            GradeBand::new(ExamType::Gpa, "F", 0.0, 39.99).with_point(0.0),
        ]);
        Self { bands }
    }
}
