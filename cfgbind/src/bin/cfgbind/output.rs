use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME, Tone};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Data that can be shown as a table or a one-line summary
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Routes command results and status messages to the terminal
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Status messages only accompany table output; JSON and compact output
    /// stay machine-readable.
    pub fn is_human(&self) -> bool {
        !self.options.quiet && self.options.output_format == OutputFormat::Table
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(&self.options)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    fn styled_line(&self, icon: &str, tone: Tone, message: &str) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", tone.paint(icon), tone.paint(message))
        }
    }

    pub fn success(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.styled_line(ICONS.success, THEME.success, message));
        }
    }

    /// Errors are printed in every mode, to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.styled_line(ICONS.error, THEME.error, message));
    }

    pub fn warning(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.styled_line(ICONS.warning, THEME.warning, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_human() {
            println!("{}", self.styled_line(ICONS.info, THEME.info, message));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.is_human() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", THEME.heading.paint(text).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.is_human() {
            return;
        }
        if self.options.no_color {
            println!("{key}: {value}");
        } else {
            println!("{}: {}", THEME.key.paint(key).bold(), THEME.value.paint(value));
        }
    }

    /// Indented detail line under a table or message
    pub fn detail(&self, icon: &str, text: &str) {
        if !self.is_human() {
            return;
        }
        if self.options.no_color {
            println!("  {icon} {text}");
        } else {
            println!("  {} {text}", THEME.muted.paint(icon));
        }
    }
}

/// A table with the CLI's preset and a bold header row
pub fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    let preset = if options.no_color {
        comfy_table::presets::ASCII_FULL
    } else {
        comfy_table::presets::UTF8_FULL_CONDENSED
    };
    table.load_preset(preset);

    table.set_header(headers.iter().map(|header| {
        let cell = Cell::new(header).add_attribute(Attribute::Bold);
        if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
    }));

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        section: String,
        entries: usize,
    }

    impl TableDisplay for Row {
        fn to_table(&self, options: &GlobalOptions) -> Table {
            let mut table = themed_table(options, &["Section", "Entries"]);
            table.add_row(vec![Cell::new(&self.section), Cell::new(self.entries)]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.section, self.entries)
        }
    }

    fn row() -> Row {
        Row {
            section: "General".to_string(),
            entries: 2,
        }
    }

    #[test]
    fn test_machine_formats_are_not_human() {
        for output_format in [OutputFormat::Json, OutputFormat::Compact] {
            let manager = OutputManager::new(GlobalOptions {
                output_format,
                ..Default::default()
            });
            assert!(manager.display(&row()).is_ok());
            assert!(!manager.is_human());
        }
    }

    #[test]
    fn test_quiet_suppresses_everything() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&row()).is_ok());
        assert!(!manager.is_human());
    }

    #[test]
    fn test_plain_styled_line() {
        let manager = OutputManager::new(GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(manager.styled_line("✓", THEME.success, "done"), "✓ done");
        assert!(manager.is_human());
    }

    #[test]
    fn test_themed_table_headers() {
        let options = GlobalOptions {
            no_color: true,
            ..Default::default()
        };
        let rendered = row().to_table(&options).to_string();
        assert!(rendered.contains("Section"));
        assert!(rendered.contains("General"));
    }
}
