use serde::{Deserialize, Serialize};
use std::fmt;

/// Grading scale family an exam belongs to. Each family has its own bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    GeneralPurpose,
    SchoolBased,
    CollegeBased,
    Gpa,
}

impl ExamType {
    pub const ALL: [ExamType; 4] = [
        ExamType::GeneralPurpose,
        ExamType::SchoolBased,
        ExamType::CollegeBased,
        ExamType::Gpa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::GeneralPurpose => "general_purpose",
            ExamType::SchoolBased => "school_based",
            ExamType::CollegeBased => "college_based",
            ExamType::Gpa => "gpa",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's mark for one subject of an exam.
///
/// `marks_obtained` is `None` when no mark was ever entered, which is not the
/// same thing as an entered zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamMark {
    pub subject_id: u64,
    pub subject_name: String,
    pub subject_code: Option<String>,
    pub marks_obtained: Option<f64>,
    pub max_marks: f64,
    pub passing_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubjectResult {
    pub subject_id: u64,
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    pub marks_obtained: f64,
    pub max_marks: f64,
    pub is_pass: bool,
    #[serde(default)]
    pub is_absent: bool,
}

/// Aggregated result of one student in one exam.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StudentExamResult {
    pub student_id: u64,
    pub admission_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_roll_number: Option<String>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub subjects: Vec<SubjectResult>,
    pub total_marks_obtained: f64,
    pub total_max_marks: f64,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_point: Option<f64>,
    pub is_pass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl StudentExamResult {
    /// "First Last", or just the first name when no last name is recorded
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// Roll number shown to the student: the exam roll number when assigned
    pub fn display_roll(&self) -> Option<&str> {
        self.exam_roll_number
            .as_deref()
            .or(self.roll_no.as_deref())
    }
}

/// Round to two decimal places, the precision percentages are graded and ranked at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> StudentExamResult {
        StudentExamResult {
            student_id: 5,
            admission_no: "A-100".to_string(),
            roll_no: Some("12".to_string()),
            exam_roll_number: None,
            first_name: "Asha".to_string(),
            last_name: Some("Rao".to_string()),
            subjects: vec![],
            total_marks_obtained: 0.0,
            total_max_marks: 0.0,
            percentage: 0.0,
            grade: None,
            grade_point: None,
            is_pass: false,
            rank: None,
        }
    }

    #[test]
    fn test_exam_type_serde_names() {
        let parsed: ExamType = serde_json::from_str("\"college_based\"").unwrap();
        assert_eq!(parsed, ExamType::CollegeBased);
        assert_eq!(serde_json::to_string(&ExamType::Gpa).unwrap(), "\"gpa\"");
    }

    #[test]
    fn test_full_name() {
        let mut result = sample_result();
        assert_eq!(result.full_name(), "Asha Rao");
        result.last_name = None;
        assert_eq!(result.full_name(), "Asha");
        result.last_name = Some("  ".to_string());
        assert_eq!(result.full_name(), "Asha");
    }

    #[test]
    fn test_display_roll_prefers_exam_roll_number() {
        let mut result = sample_result();
        assert_eq!(result.display_roll(), Some("12"));
        result.exam_roll_number = Some("R045".to_string());
        assert_eq!(result.display_roll(), Some("R045"));
    }

    #[test]
    fn test_result_parses_minimal_payload() {
        let json = r#"{
            "student_id": 7,
            "admission_no": "A-7",
            "first_name": "Ravi",
            "subjects": [
                {"subject_id": 1, "subject_name": "Maths", "marks_obtained": 72, "max_marks": 100, "is_pass": true}
            ],
            "total_marks_obtained": 72,
            "total_max_marks": 100,
            "percentage": 72.0,
            "is_pass": true
        }"#;
        let result: StudentExamResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.student_id, 7);
        assert!(result.rank.is_none());
        assert!(result.grade.is_none());
        assert!(!result.subjects[0].is_absent);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(89.99), 89.99);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(72.0), 72.0);
    }
}
