use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoring::{ExamType, StudentExamResult};

/// An exam whose results are open for lookup
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PublishedExam {
    pub id: u64,
    pub name: String,
    pub exam_group_name: String,
    pub session_name: String,
    pub exam_type: ExamType,
}

/// A validated result lookup: exam plus the student's public credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub exam_id: u64,
    pub roll_number: String,
    pub date_of_birth: NaiveDate,
}

/// Request body of the lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupRequest {
    pub exam_id: u64,
    pub roll_no: String,
    pub dob: NaiveDate,
}

impl From<&LookupQuery> for LookupRequest {
    fn from(query: &LookupQuery) -> Self {
        Self {
            exam_id: query.exam_id,
            roll_no: query.roll_number.clone(),
            dob: query.date_of_birth,
        }
    }
}

/// Outcome of a lookup that reached the server and got a 2xx answer
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Box<StudentExamResult>),
    NotFound,
}

/// Scope of a class-level result report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassReportQuery {
    pub exam_id: u64,
    pub class_id: u64,
    pub section_id: u64,
    pub session_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error body returned by the server on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// Decode a 2xx body that is either the value itself or an envelope
/// `{"data": ..., ...}`.
///
/// `Ok(None)` covers only an empty body, `null`, `{}` and `{"data": null}`.
/// Anything else that does not decode as `T` is an error, including failure
/// envelopes without `data`.
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<Option<T>, serde_json::Error> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let mut value: Value = serde_json::from_str(body)?;
    match &mut value {
        Value::Null => return Ok(None),
        Value::Object(map) if map.is_empty() => return Ok(None),
        Value::Object(map) => {
            if let Some(data) = map.remove("data") {
                return serde_json::from_value(data);
            }
        }
        _ => {}
    }
    serde_json::from_value(value).map(Some)
}
