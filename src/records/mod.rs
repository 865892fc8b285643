mod sheet;

pub use sheet::{
    load_mark_sheet, Enrolment, ExamRecord, ExamSubject, MarkEntry, MarkSheet, StudentRecord,
};

use chrono::NaiveDate;

/// Read access to stored exams, students and marks.
///
/// The scoring engine only ever reads through this trait.
pub trait MarkStore {
    fn exam(&self, exam_id: u64) -> Option<&ExamRecord>;

    fn student(&self, student_id: u64) -> Option<&StudentRecord>;

    /// The entered mark, or `None` when no mark was entered for the subject
    fn mark(&self, exam_id: u64, student_id: u64, subject_id: u64) -> Option<f64>;

    fn published_exams(&self) -> Vec<&ExamRecord>;

    /// Students of one class section and session who sit the exam
    fn enrolled_students(
        &self,
        exam_id: u64,
        class_id: u64,
        section_id: u64,
        session_id: u64,
    ) -> Vec<&StudentRecord> {
        let Some(exam) = self.exam(exam_id) else {
            return Vec::new();
        };
        exam.enrolments
            .iter()
            .filter_map(|e| self.student(e.student_id))
            .filter(|s| {
                s.class_id == class_id && s.section_id == section_id && s.session_id == session_id
            })
            .collect()
    }

    /// Find the student of a published exam matching a roll number and date
    /// of birth. The roll number may be the exam roll number or the class
    /// roll number; comparison ignores case and surrounding whitespace.
    fn find_by_credentials(
        &self,
        exam_id: u64,
        roll_number: &str,
        date_of_birth: NaiveDate,
    ) -> Option<&StudentRecord> {
        let exam = self.exam(exam_id).filter(|e| e.published)?;
        let roll = roll_number.trim();
        if roll.is_empty() {
            return None;
        }
        let matches_roll =
            |candidate: Option<&str>| candidate.is_some_and(|c| c.trim().eq_ignore_ascii_case(roll));

        exam.enrolments.iter().find_map(|enrolment| {
            let student = self.student(enrolment.student_id)?;
            let roll_ok = matches_roll(enrolment.exam_roll_number.as_deref())
                || matches_roll(student.roll_no.as_deref());
            (roll_ok && student.date_of_birth == date_of_birth).then_some(student)
        })
    }
}

impl MarkStore for MarkSheet {
    fn exam(&self, exam_id: u64) -> Option<&ExamRecord> {
        self.exams.iter().find(|e| e.id == exam_id)
    }

    fn student(&self, student_id: u64) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id == student_id)
    }

    fn mark(&self, exam_id: u64, student_id: u64, subject_id: u64) -> Option<f64> {
        self.marks
            .iter()
            .find(|m| m.exam_id == exam_id && m.student_id == student_id && m.subject_id == subject_id)
            .and_then(|m| m.marks_obtained)
    }

    fn published_exams(&self) -> Vec<&ExamRecord> {
        self.exams.iter().filter(|e| e.published).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ExamType;

    fn sheet() -> MarkSheet {
        let student = |id: u64, roll: &str, dob: (i32, u32, u32), section_id: u64| StudentRecord {
            id,
            admission_no: format!("A-{}", id),
            roll_no: Some(roll.to_string()),
            first_name: format!("Student {}", id),
            last_name: None,
            date_of_birth: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2).unwrap(),
            class_id: 7,
            section_id,
            session_id: 3,
        };
        let exam = |id: u64, published: bool| ExamRecord {
            id,
            name: format!("Exam {}", id),
            exam_group_name: "Group".to_string(),
            session_id: 3,
            session_name: "2025-26".to_string(),
            exam_type: ExamType::SchoolBased,
            published,
            subjects: vec![],
            enrolments: vec![
                Enrolment { student_id: 1, exam_roll_number: Some("R045".to_string()) },
                Enrolment { student_id: 2, exam_roll_number: None },
                Enrolment { student_id: 3, exam_roll_number: None },
            ],
        };
        MarkSheet {
            exams: vec![exam(1, true), exam(2, false)],
            students: vec![
                student(1, "11", (2010, 5, 12), 1),
                student(2, "12", (2010, 6, 1), 1),
                student(3, "13", (2010, 7, 1), 2),
                student(4, "14", (2010, 8, 1), 1),
            ],
            marks: vec![
                MarkEntry { exam_id: 1, student_id: 1, subject_id: 10, marks_obtained: Some(0.0) },
                MarkEntry { exam_id: 1, student_id: 2, subject_id: 10, marks_obtained: None },
            ],
        }
    }

    fn dob(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_zero_vs_unset() {
        let sheet = sheet();
        assert_eq!(sheet.mark(1, 1, 10), Some(0.0));
        assert_eq!(sheet.mark(1, 2, 10), None);
        assert_eq!(sheet.mark(1, 3, 10), None);
    }

    #[test]
    fn test_find_by_exam_roll_number() {
        let sheet = sheet();
        let found = sheet.find_by_credentials(1, "R045", dob(2010, 5, 12)).unwrap();
        assert_eq!(found.id, 1);
        let found = sheet.find_by_credentials(1, "  r045 ", dob(2010, 5, 12)).unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_find_by_class_roll_number() {
        let sheet = sheet();
        let found = sheet.find_by_credentials(1, "12", dob(2010, 6, 1)).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn test_find_requires_matching_dob() {
        let sheet = sheet();
        assert!(sheet.find_by_credentials(1, "R045", dob(2010, 5, 13)).is_none());
    }

    #[test]
    fn test_find_ignores_unpublished_and_unenrolled() {
        let sheet = sheet();
        assert!(sheet.find_by_credentials(2, "R045", dob(2010, 5, 12)).is_none());
        // Student 4 exists but does not sit exam 1
        assert!(sheet.find_by_credentials(1, "14", dob(2010, 8, 1)).is_none());
        assert!(sheet.find_by_credentials(1, "", dob(2010, 5, 12)).is_none());
    }

    #[test]
    fn test_enrolled_students_filters_section() {
        let sheet = sheet();
        let ids: Vec<u64> = sheet.enrolled_students(1, 7, 1, 3).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(sheet.enrolled_students(9, 7, 1, 3).is_empty());
        assert!(sheet.enrolled_students(1, 8, 1, 3).is_empty());
    }

    #[test]
    fn test_published_exams() {
        let sheet = sheet();
        let published = sheet.published_exams();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, 1);
    }
}
