//
//  lighthouse-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Formatting for everything `lh` prints on stdout:
//!
//! - **Table format**: Human-readable output for interactive terminal use
//! - **JSON format**: The API records as pretty-printed JSON, for scripting
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: The available output formats
//! - [`OutputWriter`]: Main entry point for writing formatted output
//! - [`TableOutput`]: Trait for types that know how to print themselves for humans
//! - [`TableBuilder`]: Lists render as tables
//!
//! ## Example
//!
//! ```rust,ignore
//! use lighthouse_cli::output::{OutputWriter, OutputFormat};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write(&ticket)?;
//! writer.write_success("Ticket #12 updated");
//! ```

mod table;

pub use table::*;

use serde::Serialize;

/// Represents the available output formats for CLI output.
///
/// The default is [`OutputFormat::Table`]; `--json` switches to
/// [`OutputFormat::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable format with optional color support.
    #[default]
    Table,
    /// Pretty-printed JSON of the API records.
    Json,
}

/// A unified output writer that handles both output formats.
///
/// Data goes to stdout. Status messages (`write_success`, `write_warning`
/// and friends) go to stderr so `--json` output stays parseable.
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer for `format`, detecting terminal color support.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    pub fn table() -> Self {
        Self::new(OutputFormat::Table)
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns `true` when output is JSON.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single value in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", to_json(value)?),
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes a list of values, as a JSON array or as a table with one row
    /// per value.
    ///
    /// JSON output is always an array, even when `values` is empty. An empty
    /// table prints `empty` to stderr instead.
    pub fn write_table<T, const N: usize>(
        &self,
        values: &[T],
        headers: [&str; N],
        empty: &str,
        row: impl Fn(&T) -> [String; N],
    ) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        match self.format {
            OutputFormat::Json => println!("{}", to_json(values)?),
            OutputFormat::Table if values.is_empty() => self.write_info(empty),
            OutputFormat::Table => TableBuilder::new()
                .color(self.color)
                .headers(headers)
                .rows(values.iter().map(&row))
                .print(),
        }
        Ok(())
    }

    pub fn write_error(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", console::style("✗").red().bold(), message);
        } else {
            eprintln!("Error: {}", message);
        }
    }

    pub fn write_warning(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", console::style("!").yellow().bold(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
    }

    pub fn write_info(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", console::style("→").cyan(), message);
        } else {
            eprintln!("{}", message);
        }
    }

    pub fn write_success(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", console::style("✓").green().bold(), message);
        } else {
            eprintln!("{}", message);
        }
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::table()
    }
}

/// Serializes `value` as pretty JSON with a two-space indent.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Trait for types that render themselves for a terminal.
///
/// List items usually print one line; detail views print a header followed
/// by [`print_field`] rows.
pub trait TableOutput {
    /// Prints the value to stdout, using ANSI colors when `color` is set.
    fn print_table(&self, color: bool);
}

/// Prints a bold section header.
pub fn print_header(title: &str, color: bool) {
    if color {
        println!("{}", console::style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Prints a `Label: value` row with the label padded to a common width.
pub fn print_field(label: &str, value: &str, color: bool) {
    if color {
        println!("{:>14}: {}", console::style(label).dim(), value);
    } else {
        println!("{:>14}: {}", label, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: u64,
        name: &'static str,
    }

    #[test]
    fn test_default_format_is_table() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
        assert!(!OutputWriter::default().is_json());
        assert!(OutputWriter::json().is_json());
    }

    #[test]
    fn test_to_json_is_pretty() {
        let json = to_json(&Row { id: 7, name: "Widgets" }).unwrap();
        assert_eq!(json, "{\n  \"id\": 7,\n  \"name\": \"Widgets\"\n}");
    }

    #[test]
    fn test_to_json_empty_list() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(to_json(&rows).unwrap(), "[]");
    }
}
