//
//  asc-cli
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Table output using comfy-table.

use chrono::DateTime;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

use super::TableOutput;

/// Longest cell rendered before truncation.
pub const MAX_CELL_WIDTH: usize = 80;

/// Creates a table with the standard preset.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builder for result tables.
///
/// Columns whose non-empty cells are all numbers or timestamps are
/// right-aligned. Without color the table is rendered as if stdout were not a
/// terminal, so no escape sequences are emitted.
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            color: false,
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self.rows.push(row.into_iter().map(|s| s.into()).collect());
        }
        self
    }

    pub fn build(self) -> Table {
        let mut table = create_table();
        if !self.color {
            table.force_no_tty();
        }

        let state_columns: Vec<bool> = self
            .headers
            .iter()
            .map(|h| h.to_ascii_lowercase().contains("state"))
            .collect();

        if self.color {
            table.set_header(self.headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
        } else {
            table.set_header(&self.headers);
        }

        for row in &self.rows {
            let cells = row.iter().enumerate().map(|(index, value)| {
                let text = cell_text(value);
                if self.color && state_columns.get(index).copied().unwrap_or(false) {
                    Cell::new(format_state(&text, true))
                } else {
                    Cell::new(text)
                }
            });
            table.add_row(cells);
        }

        for index in 0..self.headers.len() {
            if is_right_aligned(self.rows.iter().filter_map(|row| row.get(index))) {
                if let Some(column) = table.column_mut(index) {
                    column.set_cell_alignment(CellAlignment::Right);
                }
            }
        }

        table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a result: label lines for its fields, then its table.
pub fn render_table<T: TableOutput + ?Sized>(value: &T, color: bool) -> String {
    let mut out = String::new();

    let fields = value.fields();
    for (label, text) in &fields {
        if color {
            out.push_str(&format!("{}: {}\n", console::style(label).dim(), text));
        } else {
            out.push_str(&format!("{label}: {text}\n"));
        }
    }

    let headers = value.headers();
    if headers.is_empty() {
        return out;
    }
    if !fields.is_empty() {
        out.push('\n');
    }

    let table = TableBuilder::new()
        .color(color)
        .headers(headers)
        .rows(value.rows())
        .build();
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

/// Colors App Store Connect processing and review states.
pub fn format_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_string();
    }

    use console::style;
    match state.to_ascii_uppercase().as_str() {
        "VALID" | "READY_FOR_SALE" | "READY_FOR_DISTRIBUTION" | "ACCEPTED" | "APPROVED" => {
            style(state).green().to_string()
        }
        "PROCESSING" | "WAITING_FOR_REVIEW" | "IN_REVIEW" | "PREPARE_FOR_SUBMISSION" => {
            style(state).yellow().to_string()
        }
        "INVALID" | "FAILED" | "REJECTED" | "METADATA_REJECTED" | "DEVELOPER_REJECTED" => {
            style(state).red().to_string()
        }
        _ => state.to_string(),
    }
}

fn cell_text(value: &str) -> String {
    let flat = value.replace("\r\n", "\\n").replace('\n', "\\n");
    crate::util::truncate(&flat, MAX_CELL_WIDTH)
}

fn is_right_aligned<'a>(cells: impl Iterator<Item = &'a String>) -> bool {
    let mut seen = false;
    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        seen = true;
        let numeric = cell.parse::<f64>().is_ok();
        let timestamp = DateTime::parse_from_rfc3339(cell).is_ok();
        if !numeric && !timestamp {
            return false;
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_detection() {
        let numbers = ["12".to_string(), "".to_string(), "3.5".to_string()];
        assert!(is_right_aligned(numbers.iter()));

        let times = ["2026-10-17T08:00:00Z".to_string(), "2026-10-17T08:00:00.000+00:00".to_string()];
        assert!(is_right_aligned(times.iter()));

        let mixed = ["12".to_string(), "IOS".to_string()];
        assert!(!is_right_aligned(mixed.iter()));

        let empty: [String; 0] = [];
        assert!(!is_right_aligned(empty.iter()));
    }

    #[test]
    fn test_plain_table_has_no_escape_codes() {
        let table = TableBuilder::new()
            .headers(["ID", "State"])
            .rows([["1", "VALID"], ["2", "line\nbreak"]])
            .build()
            .to_string();
        assert!(!table.contains('\u{1b}'));
        assert!(table.contains("line\\nbreak"));
    }

    #[test]
    fn test_cells_are_truncated() {
        let long = "x".repeat(200);
        assert_eq!(cell_text(&long).chars().count(), MAX_CELL_WIDTH);
    }

    #[test]
    fn test_format_state_without_color() {
        assert_eq!(format_state("VALID", false), "VALID");
    }
}
