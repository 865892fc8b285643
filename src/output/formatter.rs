use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::theme::Painter;
use crate::api::PublishedExam;
use crate::scoring::{StudentExamResult, SubjectResult};

pub const NO_EXAMS_MESSAGE: &str = "No published exams found.";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Two decimals, no unit
pub fn format_marks(value: f64) -> String {
    format!("{:.2}", value)
}

/// "72.00%"
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// "B (3.0)", "B", or "-" when no band matched
pub fn format_grade(grade: Option<&str>, grade_point: Option<f64>) -> String {
    match (grade, grade_point) {
        (Some(grade), Some(point)) => format!("{} ({:.1})", grade, point),
        (Some(grade), None) => grade.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// One exam per line: "{id}  {name}  {group} | {session} | {type}"
pub fn format_exam_list(exams: &[PublishedExam], painter: &Painter) -> String {
    if exams.is_empty() {
        return NO_EXAMS_MESSAGE.to_string();
    }

    let id_width = exams
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);

    exams
        .iter()
        .map(|exam| {
            let id = format!("{:>width$}", exam.id, width = id_width);
            let details = format!(
                "{} | {} | {}",
                exam.exam_group_name, exam.session_name, exam.exam_type
            );
            format!(
                "{}  {}  {}",
                painter.muted(&id),
                painter.heading(&exam.name),
                painter.muted(&details)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_subject_line(subject: &SubjectResult, name_width: usize, painter: &Painter) -> String {
    let name = pad_right(&subject.subject_name, name_width);
    let code = pad_right(subject.subject_code.as_deref().unwrap_or("-"), 8);
    let marks = if subject.is_absent {
        format!("{:>7}", "AB")
    } else {
        format!("{:>7}", format_marks(subject.marks_obtained))
    };
    let verdict = if subject.is_absent {
        painter.fail("ABSENT")
    } else {
        painter.verdict(subject.is_pass)
    };
    format!(
        "  {}  {}  {} / {:>7}  {}",
        name,
        code,
        marks,
        format_marks(subject.max_marks),
        verdict
    )
}

/// Multi-line result card for a single student
pub fn format_result_card(
    result: &StudentExamResult,
    exam_name: Option<&str>,
    painter: &Painter,
) -> String {
    let mut lines = Vec::new();

    let mut ids = vec![format!("Adm {}", result.admission_no)];
    if let Some(roll) = result.display_roll() {
        ids.insert(0, format!("Roll {}", roll));
    }
    lines.push(format!(
        "{}  {}",
        painter.heading(&result.full_name()),
        painter.muted(&format!("({})", ids.join(", ")))
    ));
    if let Some(exam) = exam_name {
        lines.push(format!("Exam: {}", exam));
    }

    if !result.subjects.is_empty() {
        let name_width = result
            .subjects
            .iter()
            .map(|s| s.subject_name.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(7, 28);
        lines.push(String::new());
        for subject in &result.subjects {
            lines.push(format_subject_line(subject, name_width, painter));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Total: {} / {}",
        format_marks(result.total_marks_obtained),
        format_marks(result.total_max_marks)
    ));
    lines.push(format!(
        "Percentage: {}",
        format_percentage(result.percentage)
    ));
    lines.push(format!(
        "Grade: {}",
        painter.grade(&format_grade(result.grade.as_deref(), result.grade_point))
    ));
    lines.push(format!("Result: {}", painter.verdict(result.is_pass)));
    if let Some(rank) = result.rank {
        lines.push(format!("Rank: {}", rank));
    }

    lines.join("\n")
}

/// Ranked class table: Rank, Admission, Name, Total, Percentage, Grade, Result.
/// Names are truncated to the terminal width; pipes get full names.
pub fn format_class_table(results: &[StudentExamResult], painter: &Painter) -> String {
    if results.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let rank_width = 4;
    let adm_width = results
        .iter()
        .map(|r| r.admission_no.chars().count())
        .max()
        .unwrap_or(0)
        .max(3);
    // total "999.99/999.99", percentage "100.00%", grade "A+ (4.0)", verdict
    let fixed_width = rank_width + adm_width + 15 + 9 + 10 + 4 + 2 * 6;

    let name_width = results
        .iter()
        .map(|r| r.full_name().chars().count())
        .max()
        .unwrap_or(0);
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => name_width.min(width - fixed_width),
        Some(_) => name_width.min(20),
        None => name_width,
    };

    results
        .iter()
        .map(|result| {
            let rank = match result.rank {
                Some(rank) => format!("{:>3}.", rank),
                None => format!("{:>4}", "-"),
            };
            let name = pad_right(&truncate_name(&result.full_name(), name_width), name_width);
            let total = format!(
                "{:>15}",
                format!(
                    "{}/{}",
                    format_marks(result.total_marks_obtained),
                    format_marks(result.total_max_marks)
                )
            );
            let grade = pad_right(
                &format_grade(result.grade.as_deref(), result.grade_point),
                10,
            );
            format!(
                "{}  {}  {}  {}  {:>9}  {}  {}",
                painter.muted(&rank),
                pad_right(&result.admission_no, adm_width),
                name,
                total,
                format_percentage(result.percentage),
                painter.grade(&grade),
                painter.verdict(result.is_pass)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format results as tab-separated values for scripting
/// Columns: rank, admission_no, name, total, max, percentage, grade, pass
/// (no headers, no colors)
pub fn format_tsv(results: &[StudentExamResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    results
        .iter()
        .map(|result| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                result.rank.map(|r| r.to_string()).unwrap_or_default(),
                result.admission_no,
                result.full_name(),
                format_marks(result.total_marks_obtained),
                format_marks(result.total_max_marks),
                format_marks(result.percentage),
                result.grade.as_deref().unwrap_or(""),
                if result.is_pass { "pass" } else { "fail" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
