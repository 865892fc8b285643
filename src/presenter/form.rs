use chrono::NaiveDate;
use thiserror::Error;

use crate::api::LookupQuery;

/// Raw input of the result lookup form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupForm {
    pub exam_id: Option<u64>,
    pub roll_number: String,
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select an exam.")]
    MissingExam,

    #[error("Please enter both Roll Number and Date of Birth.")]
    MissingCredentials,

    #[error("Date of Birth must be a valid date in YYYY-MM-DD format.")]
    InvalidDate(String),
}

impl LookupForm {
    pub fn new(exam_id: Option<u64>, roll_number: &str, date_of_birth: &str) -> Self {
        Self {
            exam_id,
            roll_number: roll_number.to_string(),
            date_of_birth: date_of_birth.to_string(),
        }
    }

    /// Check the form locally. Nothing is sent unless this succeeds.
    pub fn validate(&self) -> Result<LookupQuery, FormError> {
        let exam_id = self.exam_id.ok_or(FormError::MissingExam)?;

        let roll_number = self.roll_number.trim();
        let date_of_birth = self.date_of_birth.trim();
        if roll_number.is_empty() || date_of_birth.is_empty() {
            return Err(FormError::MissingCredentials);
        }

        let date_of_birth = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(date_of_birth.to_string()))?;

        Ok(LookupQuery {
            exam_id,
            roll_number: roll_number.to_string(),
            date_of_birth,
        })
    }
}
