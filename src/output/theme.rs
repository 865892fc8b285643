//! Colour theme for terminal output

use owo_colors::{AnsiColors, OwoColorize};
use serde::{Deserialize, Serialize};

/// Theme chosen by the user and remembered between runs
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    /// Follow the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemePreference {
    /// Resolve `Auto` by probing the terminal background. Falls back to dark
    /// when the terminal does not answer.
    pub fn resolve(self) -> ThemePreference {
        match self {
            ThemePreference::Auto => match terminal_light::luma() {
                Ok(luma) if luma > 0.6 => ThemePreference::Light,
                _ => ThemePreference::Dark,
            },
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Auto => "auto",
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }
}

/// Colours used by the formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub pass: AnsiColors,
    pub fail: AnsiColors,
    pub heading: AnsiColors,
    pub grade: AnsiColors,
    pub muted: AnsiColors,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            pass: AnsiColors::BrightGreen,
            fail: AnsiColors::BrightRed,
            heading: AnsiColors::Cyan,
            grade: AnsiColors::BrightYellow,
            muted: AnsiColors::BrightBlack,
        }
    }

    pub fn light() -> Self {
        Self {
            pass: AnsiColors::Green,
            fail: AnsiColors::Red,
            heading: AnsiColors::Blue,
            grade: AnsiColors::Magenta,
            muted: AnsiColors::BrightBlack,
        }
    }

    pub fn for_theme(theme: ThemePreference) -> Self {
        match theme.resolve() {
            ThemePreference::Light => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Applies a palette, or nothing when colours are off (pipes, TSV)
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    palette: Option<Palette>,
}

impl Painter {
    pub fn new(use_colors: bool, theme: ThemePreference) -> Self {
        Self {
            palette: use_colors.then(|| Palette::for_theme(theme)),
        }
    }

    pub fn plain() -> Self {
        Self { palette: None }
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self {
            palette: Some(palette),
        }
    }

    pub fn uses_colors(&self) -> bool {
        self.palette.is_some()
    }

    fn paint(&self, text: &str, pick: fn(&Palette) -> AnsiColors) -> String {
        match &self.palette {
            Some(palette) => text.color(pick(palette)).to_string(),
            None => text.to_string(),
        }
    }

    pub fn pass(&self, text: &str) -> String {
        self.paint(text, |p| p.pass)
    }

    pub fn fail(&self, text: &str) -> String {
        self.paint(text, |p| p.fail)
    }

    pub fn grade(&self, text: &str) -> String {
        self.paint(text, |p| p.grade)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, |p| p.muted)
    }

    pub fn heading(&self, text: &str) -> String {
        match &self.palette {
            Some(palette) => text.color(palette.heading).bold().to_string(),
            None => text.to_string(),
        }
    }

    /// "PASS"/"FAIL" in the matching colour
    pub fn verdict(&self, is_pass: bool) -> String {
        if is_pass {
            self.pass("PASS")
        } else {
            self.fail("FAIL")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_serde_names() {
        let json = serde_json::to_string(&ThemePreference::Light).unwrap();
        assert_eq!(json, "\"light\"");
        let parsed: ThemePreference = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(parsed, ThemePreference::Auto);
    }

    #[test]
    fn test_explicit_theme_resolves_to_itself() {
        assert_eq!(ThemePreference::Dark.resolve(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Light.resolve(), ThemePreference::Light);
    }

    #[test]
    fn test_plain_painter_adds_no_escapes() {
        let painter = Painter::plain();
        assert_eq!(painter.verdict(true), "PASS");
        assert_eq!(painter.heading("Total"), "Total");
        assert!(!painter.uses_colors());
    }

    #[test]
    fn test_coloured_painter_wraps_text() {
        let painter = Painter::with_palette(Palette::dark());
        let text = painter.verdict(false);
        assert!(text.contains("FAIL"));
        assert!(text.contains('\u{1b}'));
    }
}
