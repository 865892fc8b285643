use thiserror::Error;

use super::types::ExamType;

/// Errors raised while computing exam results
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("Exam not found: {0}")]
    ExamNotFound(u64),

    #[error("Student not found: {0}")]
    StudentNotFound(u64),

    #[error("Student {student_id} is not enrolled in exam {exam_id}")]
    NotEnrolled { exam_id: u64, student_id: u64 },

    #[error("Subject {subject_id}: {reason}")]
    InvalidSubject { subject_id: u64, reason: String },

    #[error("Subject {subject_id}: marks obtained {marks} cannot be negative")]
    NegativeMarks { subject_id: u64, marks: f64 },

    #[error("Subject {subject_id}: marks obtained {marks_obtained} exceed maximum {max_marks}")]
    MarksExceedMax {
        subject_id: u64,
        marks_obtained: f64,
        max_marks: f64,
    },

    #[error("Student {student_id}: total maximum marks is zero, percentage is undefined")]
    ZeroMaxMarks { student_id: u64 },

    #[error("No {exam_type} grade band contains {percentage:.2}%")]
    NoGradeBand { exam_type: ExamType, percentage: f64 },

    #[error("{percentage:.2}% matches several {exam_type} grade bands: {grades:?}")]
    AmbiguousGradeBand {
        exam_type: ExamType,
        percentage: f64,
        grades: Vec<String>,
    },
}

impl ScoringError {
    /// True when the error names a record that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ScoringError::ExamNotFound(_)
                | ScoringError::StudentNotFound(_)
                | ScoringError::NotEnrolled { .. }
        )
    }
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
