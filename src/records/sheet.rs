use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::api::types::PublishedExam;
use crate::scoring::ExamType;

/// The system of record: exams, students and entered marks.
///
/// Example YAML:
/// ```yaml
/// exams:
///   - id: 1
///     name: "Term 1"
///     exam_group_name: "Midterms"
///     session_id: 3
///     session_name: "2025-26"
///     exam_type: school_based
///     published: true
///     subjects:
///       - { subject_id: 10, subject_name: "Mathematics", max_marks: 100, passing_marks: 40 }
///     enrolments:
///       - { student_id: 5, exam_roll_number: "R045" }
/// students:
///   - { id: 5, admission_no: "A-100", first_name: "Asha", date_of_birth: "2010-05-12",
///       class_id: 7, section_id: 1, session_id: 3 }
/// marks:
///   - { exam_id: 1, student_id: 5, subject_id: 10, marks_obtained: 72 }
/// ```
///
/// A subject with no mark entry, or with `marks_obtained: null`, has no mark
/// entered.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarkSheet {
    #[serde(default)]
    pub exams: Vec<ExamRecord>,
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub marks: Vec<MarkEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExamRecord {
    pub id: u64,
    pub name: String,
    pub exam_group_name: String,
    pub session_id: u64,
    pub session_name: String,
    pub exam_type: ExamType,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub subjects: Vec<ExamSubject>,
    #[serde(default)]
    pub enrolments: Vec<Enrolment>,
}

impl ExamRecord {
    pub fn summary(&self) -> PublishedExam {
        PublishedExam {
            id: self.id,
            name: self.name.clone(),
            exam_group_name: self.exam_group_name.clone(),
            session_name: self.session_name.clone(),
            exam_type: self.exam_type,
        }
    }

    pub fn enrolment(&self, student_id: u64) -> Option<&Enrolment> {
        self.enrolments.iter().find(|e| e.student_id == student_id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExamSubject {
    pub subject_id: u64,
    pub subject_name: String,
    #[serde(default)]
    pub subject_code: Option<String>,
    pub max_marks: f64,
    pub passing_marks: f64,
}

/// A student sitting an exam, with the roll number printed on their admit card
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Enrolment {
    pub student_id: u64,
    #[serde(default)]
    pub exam_roll_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StudentRecord {
    pub id: u64,
    pub admission_no: String,
    #[serde(default)]
    pub roll_no: Option<String>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub class_id: u64,
    pub section_id: u64,
    pub session_id: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarkEntry {
    pub exam_id: u64,
    pub student_id: u64,
    pub subject_id: u64,
    #[serde(default)]
    pub marks_obtained: Option<f64>,
}

/// Load a mark sheet from a YAML file
pub fn load_mark_sheet(path: &Path) -> Result<MarkSheet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mark sheet at {}", path.display()))?;

    let sheet: MarkSheet = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse mark sheet: invalid YAML in {}", path.display()))?;

    Ok(sheet)
}

impl MarkSheet {
    /// Check referential integrity of the sheet.
    /// Returns all problems at once (not just the first).
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut student_ids = HashSet::new();
        for (i, student) in self.students.iter().enumerate() {
            if !student_ids.insert(student.id) {
                errors.push(format!("students[{}]: duplicate student id {}", i, student.id));
            }
        }

        let mut exam_ids = HashSet::new();
        for (i, exam) in self.exams.iter().enumerate() {
            if !exam_ids.insert(exam.id) {
                errors.push(format!("exams[{}]: duplicate exam id {}", i, exam.id));
            }

            let mut subject_ids = HashSet::new();
            for (j, subject) in exam.subjects.iter().enumerate() {
                if !subject_ids.insert(subject.subject_id) {
                    errors.push(format!(
                        "exams[{}].subjects[{}]: duplicate subject id {}",
                        i, j, subject.subject_id
                    ));
                }
                if subject.max_marks <= 0.0 {
                    errors.push(format!(
                        "exams[{}].subjects[{}].max_marks: must be positive",
                        i, j
                    ));
                }
                if subject.passing_marks < 0.0 || subject.passing_marks > subject.max_marks {
                    errors.push(format!(
                        "exams[{}].subjects[{}].passing_marks: must lie within 0-{}",
                        i, j, subject.max_marks
                    ));
                }
            }

            let mut enrolled = HashSet::new();
            for (j, enrolment) in exam.enrolments.iter().enumerate() {
                if !student_ids.contains(&enrolment.student_id) {
                    errors.push(format!(
                        "exams[{}].enrolments[{}]: unknown student {}",
                        i, j, enrolment.student_id
                    ));
                }
                if !enrolled.insert(enrolment.student_id) {
                    errors.push(format!(
                        "exams[{}].enrolments[{}]: student {} enrolled twice",
                        i, j, enrolment.student_id
                    ));
                }
            }
        }

        let mut seen_marks = HashSet::new();
        for (i, mark) in self.marks.iter().enumerate() {
            let Some(exam) = self.exams.iter().find(|e| e.id == mark.exam_id) else {
                errors.push(format!("marks[{}]: unknown exam {}", i, mark.exam_id));
                continue;
            };
            if !student_ids.contains(&mark.student_id) {
                errors.push(format!("marks[{}]: unknown student {}", i, mark.student_id));
            }
            match exam.subjects.iter().find(|s| s.subject_id == mark.subject_id) {
                None => errors.push(format!(
                    "marks[{}]: exam {} has no subject {}",
                    i, mark.exam_id, mark.subject_id
                )),
                Some(subject) => {
                    if let Some(obtained) = mark.marks_obtained {
                        if obtained < 0.0 || obtained > subject.max_marks {
                            errors.push(format!(
                                "marks[{}]: {} is outside 0-{} for subject {}",
                                i, obtained, subject.max_marks, subject.subject_id
                            ));
                        }
                    }
                }
            }
            if !seen_marks.insert((mark.exam_id, mark.student_id, mark.subject_id)) {
                errors.push(format!(
                    "marks[{}]: duplicate mark for exam {} student {} subject {}",
                    i, mark.exam_id, mark.student_id, mark.subject_id
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
