use clap::builder::styling::AnsiColor;
use colored::{Color, ColoredString, Colorize};
use once_cell::sync::Lazy;

/// One theme color, usable for terminal output and for clap's help styles.
#[derive(Clone, Copy, Debug)]
pub struct Tone {
    pub term: Color,
    pub help: AnsiColor,
}

impl Tone {
    const fn new(term: Color, help: AnsiColor) -> Self {
        Self { term, help }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        text.color(self.term)
    }
}

/// CLI color theme, by role
pub struct ColorTheme {
    pub success: Tone,
    pub error: Tone,
    pub warning: Tone,
    pub info: Tone,
    pub heading: Tone,
    pub accent: Tone,
    pub muted: Tone,
    pub key: Tone,
    pub value: Tone,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: Tone::new(Color::Green, AnsiColor::Green),
            error: Tone::new(Color::Red, AnsiColor::Red),
            warning: Tone::new(Color::Yellow, AnsiColor::Yellow),
            info: Tone::new(Color::Blue, AnsiColor::Blue),
            heading: Tone::new(Color::BrightBlue, AnsiColor::BrightBlue),
            accent: Tone::new(Color::Cyan, AnsiColor::Cyan),
            muted: Tone::new(Color::BrightBlack, AnsiColor::BrightBlack),
            key: Tone::new(Color::BrightCyan, AnsiColor::BrightCyan),
            value: Tone::new(Color::White, AnsiColor::White),
        }
    }
}

pub static THEME: Lazy<ColorTheme> = Lazy::new(ColorTheme::default);

/// Message and status markers
pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub removed: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    removed: "-",
};
