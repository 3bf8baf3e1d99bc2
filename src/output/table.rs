//
//  lighthouse-cli
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Tabular output for lists such as tickets and milestones, built on
//! `comfy_table`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lighthouse_cli::output::TableBuilder;
//!
//! TableBuilder::new()
//!     .headers(["#", "State", "Title"])
//!     .row(["12", "open", "Crash on save"])
//!     .print();
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

/// Creates a new table with UTF-8 borders and dynamic column widths.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// A builder for constructing formatted tables with a fluent API.
///
/// Headers are cyan when color is enabled. Color support is detected on
/// creation; use [`color`](TableBuilder::color) to override it.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the table headers. Call before adding rows.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    /// Prints the table to stdout.
    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a ticket state with semantic colors.
///
/// Lighthouse states are per-project, so only the stock names are colored:
///
/// - **Green**: new, open
/// - **Yellow**: hold
/// - **Blue**: resolved
/// - **Red**: invalid
/// - **Dim**: any state the ticket reports as closed
///
/// Matching is case-insensitive.
pub fn format_state(state: &str, closed: bool, color: bool) -> String {
    if !color {
        return state.to_string();
    }

    use console::style;
    match state.to_lowercase().as_str() {
        "new" | "open" => style(state).green().to_string(),
        "hold" => style(state).yellow().to_string(),
        "resolved" => style(state).blue().to_string(),
        "invalid" => style(state).red().to_string(),
        _ if closed => style(state).dim().to_string(),
        _ => state.to_string(),
    }
}

/// Formats a boolean as `Yes`/`No`, green or dimmed when colored.
pub fn format_bool(value: bool, color: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    if !color {
        return text.to_string();
    }

    use console::style;
    if value {
        style(text).green().to_string()
    } else {
        style(text).dim().to_string()
    }
}

/// Formats an optional value, printing `-` when it is missing or empty.
pub fn format_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_state_plain() {
        assert_eq!(format_state("open", false, false), "open");
        assert_eq!(format_state("resolved", true, false), "resolved");
    }

    #[test]
    fn test_format_state_colored_wraps_text() {
        let colored = format_state("Hold", false, true);
        assert!(colored.contains("Hold"));
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(format_bool(true, false), "Yes");
        assert_eq!(format_bool(false, false), "No");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("Ada")), "Ada");
        assert_eq!(format_optional(Some("")), "-");
        assert_eq!(format_optional(None), "-");
    }

    #[test]
    fn test_builder_renders_rows() {
        let table = TableBuilder::new()
            .color(false)
            .headers(["#", "Title"])
            .rows([["1", "First"], ["2", "Second"]])
            .build();
        let rendered = table.to_string();
        assert!(rendered.contains("First"));
        assert!(rendered.contains("Second"));
    }
}
