pub mod formatter;
pub mod theme;

pub use formatter::{
    format_class_table, format_exam_list, format_grade, format_marks, format_percentage,
    format_result_card, format_tsv, should_use_colors, truncate_name, NO_EXAMS_MESSAGE,
    NO_RESULTS_MESSAGE,
};
pub use theme::{Painter, Palette, ThemePreference};
