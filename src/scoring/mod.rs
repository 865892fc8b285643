pub mod bands;
pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod types;
pub mod validation;

pub use bands::lookup_grade;
pub use config::*;
pub use engine::{aggregate_result, overall_pass, score_subject, ScoringEngine, StudentIdentity};
pub use error::{ScoringError, ScoringResult};
pub use ranking::{compare_for_rank, rank_results};
pub use types::{round2, ExamMark, ExamType, StudentExamResult, SubjectResult};
pub use validation::validate_grading;
