use chrono::NaiveDate;
use tracing::debug;

use super::bands::{lookup_grade, EPSILON};
use super::config::{AbsentMarkPolicy, GradingScale, ScoringPolicy};
use super::error::{ScoringError, ScoringResult};
use super::ranking::rank_results;
use super::types::{ExamMark, ExamType, StudentExamResult, SubjectResult};
use crate::api::types::PublishedExam;
use crate::records::{ExamRecord, MarkStore, StudentRecord};

/// Identity fields copied onto a result
#[derive(Debug, Clone, PartialEq)]
pub struct StudentIdentity {
    pub student_id: u64,
    pub admission_no: String,
    pub roll_no: Option<String>,
    pub exam_roll_number: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl StudentIdentity {
    pub fn from_record(student: &StudentRecord, exam_roll_number: Option<&str>) -> Self {
        Self {
            student_id: student.id,
            admission_no: student.admission_no.clone(),
            roll_no: student.roll_no.clone(),
            exam_roll_number: exam_roll_number.map(str::to_string),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
        }
    }
}

/// Score one subject.
///
/// Returns `Ok(None)` when the mark was never entered and the absent-mark
/// policy excludes such subjects. Marks are never clamped: a mark above the
/// maximum is corrupt data and is rejected.
pub fn score_subject(
    mark: &ExamMark,
    absent: AbsentMarkPolicy,
) -> ScoringResult<Option<SubjectResult>> {
    if !mark.max_marks.is_finite() || mark.max_marks <= 0.0 {
        return Err(ScoringError::InvalidSubject {
            subject_id: mark.subject_id,
            reason: format!("max marks {} must be positive", mark.max_marks),
        });
    }
    if !mark.passing_marks.is_finite()
        || mark.passing_marks < 0.0
        || mark.passing_marks > mark.max_marks
    {
        return Err(ScoringError::InvalidSubject {
            subject_id: mark.subject_id,
            reason: format!(
                "passing marks {} must lie within 0-{}",
                mark.passing_marks, mark.max_marks
            ),
        });
    }

    let (marks_obtained, is_absent) = match mark.marks_obtained {
        Some(m) if !m.is_finite() || m < 0.0 => {
            return Err(ScoringError::NegativeMarks {
                subject_id: mark.subject_id,
                marks: m,
            })
        }
        Some(m) if m > mark.max_marks + EPSILON => {
            return Err(ScoringError::MarksExceedMax {
                subject_id: mark.subject_id,
                marks_obtained: m,
                max_marks: mark.max_marks,
            })
        }
        Some(m) => (m, false),
        None => match absent {
            AbsentMarkPolicy::Fail => (0.0, true),
            AbsentMarkPolicy::Exclude => return Ok(None),
        },
    };

    Ok(Some(SubjectResult {
        subject_id: mark.subject_id,
        subject_name: mark.subject_name.clone(),
        subject_code: mark.subject_code.clone(),
        marks_obtained,
        max_marks: mark.max_marks,
        is_pass: !is_absent && marks_obtained >= mark.passing_marks,
        is_absent,
    }))
}

/// Overall pass policy: a student passes only when every subject passes.
/// A result with no scored subjects does not pass.
pub fn overall_pass(subjects: &[SubjectResult]) -> bool {
    !subjects.is_empty() && subjects.iter().all(|s| s.is_pass)
}

/// Aggregate a student's marks into a result (rank is left unset).
pub fn aggregate_result(
    identity: StudentIdentity,
    marks: &[ExamMark],
    exam_type: ExamType,
    scale: &GradingScale,
    absent: AbsentMarkPolicy,
) -> ScoringResult<StudentExamResult> {
    let mut subjects = Vec::with_capacity(marks.len());
    for mark in marks {
        if let Some(subject) = score_subject(mark, absent)? {
            subjects.push(subject);
        }
    }

    let total_marks_obtained: f64 = subjects.iter().map(|s| s.marks_obtained).sum();
    let total_max_marks: f64 = subjects.iter().map(|s| s.max_marks).sum();
    if total_max_marks <= 0.0 {
        return Err(ScoringError::ZeroMaxMarks {
            student_id: identity.student_id,
        });
    }

    let percentage = total_marks_obtained / total_max_marks * 100.0;
    let band = lookup_grade(scale, exam_type, percentage)?;
    let is_pass = overall_pass(&subjects);

    Ok(StudentExamResult {
        student_id: identity.student_id,
        admission_no: identity.admission_no,
        roll_no: identity.roll_no,
        exam_roll_number: identity.exam_roll_number,
        first_name: identity.first_name,
        last_name: identity.last_name,
        subjects,
        total_marks_obtained,
        total_max_marks,
        percentage,
        grade: band.as_ref().map(|b| b.grade_name.clone()),
        grade_point: band.and_then(|b| b.grade_point),
        is_pass,
        rank: None,
    })
}

/// Computes results from a mark store with a fixed grading scale and policy.
///
/// The engine holds no mutable state; every call recomputes from the store.
pub struct ScoringEngine<S> {
    store: S,
    scale: GradingScale,
    policy: ScoringPolicy,
}

impl<S: MarkStore> ScoringEngine<S> {
    pub fn new(store: S, scale: GradingScale, policy: ScoringPolicy) -> Self {
        Self {
            store,
            scale,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scale(&self) -> &GradingScale {
        &self.scale
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Published exams, for populating the exam picker
    pub fn published_exams(&self) -> Vec<PublishedExam> {
        self.store
            .published_exams()
            .into_iter()
            .map(ExamRecord::summary)
            .collect()
    }

    pub fn compute_result(&self, exam_id: u64, student_id: u64) -> ScoringResult<StudentExamResult> {
        let exam = self
            .store
            .exam(exam_id)
            .ok_or(ScoringError::ExamNotFound(exam_id))?;
        let student = self
            .store
            .student(student_id)
            .ok_or(ScoringError::StudentNotFound(student_id))?;
        self.score_enrolled(exam, student)
    }

    /// Results for every student of a class section sitting the exam, ranked.
    pub fn compute_class_results(
        &self,
        exam_id: u64,
        class_id: u64,
        section_id: u64,
        session_id: u64,
    ) -> ScoringResult<Vec<StudentExamResult>> {
        let exam = self
            .store
            .exam(exam_id)
            .ok_or(ScoringError::ExamNotFound(exam_id))?;

        let students = self
            .store
            .enrolled_students(exam_id, class_id, section_id, session_id);
        debug!(
            exam_id,
            class_id,
            section_id,
            session_id,
            students = students.len(),
            "computing class results"
        );

        let mut results = students
            .into_iter()
            .map(|student| self.score_enrolled(exam, student))
            .collect::<ScoringResult<Vec<_>>>()?;

        rank_results(&mut results, self.policy.ranking());
        Ok(results)
    }

    /// Public lookup by roll number and date of birth.
    ///
    /// `Ok(None)` means no enrolled student of a published exam matches.
    pub fn lookup(
        &self,
        exam_id: u64,
        roll_number: &str,
        date_of_birth: NaiveDate,
    ) -> ScoringResult<Option<StudentExamResult>> {
        match self
            .store
            .find_by_credentials(exam_id, roll_number, date_of_birth)
        {
            Some(student) => self.compute_result(exam_id, student.id).map(Some),
            None => {
                debug!(exam_id, "no student matches lookup credentials");
                Ok(None)
            }
        }
    }

    fn score_enrolled(
        &self,
        exam: &ExamRecord,
        student: &StudentRecord,
    ) -> ScoringResult<StudentExamResult> {
        let enrolment = exam
            .enrolment(student.id)
            .ok_or(ScoringError::NotEnrolled {
                exam_id: exam.id,
                student_id: student.id,
            })?;

        let marks: Vec<ExamMark> = exam
            .subjects
            .iter()
            .map(|subject| ExamMark {
                subject_id: subject.subject_id,
                subject_name: subject.subject_name.clone(),
                subject_code: subject.subject_code.clone(),
                marks_obtained: self.store.mark(exam.id, student.id, subject.subject_id),
                max_marks: subject.max_marks,
                passing_marks: subject.passing_marks,
            })
            .collect();

        let identity = StudentIdentity::from_record(student, enrolment.exam_roll_number.as_deref());
        aggregate_result(
            identity,
            &marks,
            exam.exam_type,
            &self.scale,
            self.policy.absent_marks,
        )
    }
}
