//
//  asc-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Every command produces one logical result value; [`OutputWriter`] encodes
//! it according to `--output`:
//!
//! | Format | Encoding |
//! |--------|----------|
//! | `json` (default) | compact JSON, or two-space indented with `--pretty` |
//! | `ndjson` | one JSON object per line; collections emit one line per resource |
//! | `table` | comfy-table columns, numeric and time columns right-aligned |
//! | `markdown` / `md` | `**Label:** value` lines and pipe tables |
//!
//! Only the result goes to stdout. Warnings, progress and errors go to stderr.
//!
//! Results implement [`TableOutput`] to describe their human-oriented shape
//! and `Serialize` for the machine-readable one.

mod json;
mod markdown;
mod table;

pub use json::*;
pub use markdown::*;
pub use table::*;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::api::{Document, Resource};
use crate::error::AscError;

/// Output encoding selected by `--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Ndjson,
    Table,
    Markdown,
}

impl OutputFormat {
    /// Parses a format name. `md` is accepted for `markdown`.
    pub fn parse(value: &str) -> Result<Self, AscError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            "table" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(AscError::usage(format!(
                "invalid output format {other:?} (expected json, ndjson, table or markdown)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Table => "table",
            Self::Markdown => "markdown",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-oriented shape of a result.
///
/// `fields` are scalar label/value pairs printed above the table. A result
/// with no headers renders only its fields.
pub trait TableOutput {
    fn fields(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn headers(&self) -> Vec<String>;

    fn rows(&self) -> Vec<Vec<String>>;
}

/// Renders results to stdout in the selected format.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    format: OutputFormat,
    pretty: bool,
    color: bool,
}

impl OutputWriter {
    /// # Errors
    ///
    /// [`AscError::Usage`] when `pretty` is combined with a non-JSON format.
    pub fn new(format: OutputFormat, pretty: bool) -> Result<Self, AscError> {
        if pretty && format != OutputFormat::Json {
            return Err(AscError::usage("--pretty is only valid with JSON output"));
        }
        Ok(Self {
            format,
            pretty,
            color: console::Term::stdout().is_term() && console::colors_enabled(),
        })
    }

    pub fn json() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: false,
            color: false,
        }
    }

    /// Forces colors on or off, e.g. for tests.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> Result<(), AscError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_to(&mut handle, value)?;
        handle.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write, T: Serialize + TableOutput>(
        &self,
        writer: &mut W,
        value: &T,
    ) -> Result<(), AscError> {
        match self.format {
            OutputFormat::Json => write_json_to(writer, value, self.pretty)?,
            OutputFormat::Ndjson => {
                let value = serde_json::to_value(value).map_err(|e| AscError::Internal(e.to_string()))?;
                for line in ndjson_lines(&value)? {
                    writeln!(writer, "{line}")?;
                }
            }
            OutputFormat::Table => write!(writer, "{}", render_table(value, self.color))?,
            OutputFormat::Markdown => write!(writer, "{}", render_markdown(value))?,
        }
        Ok(())
    }
}

/// A document rendered through a fixed column projection.
///
/// Serializes as the underlying document; the columns only shape tables.
#[derive(Debug, Clone)]
pub struct ProjectedDocument {
    pub document: Document,
    pub columns: Vec<Column>,
}

/// One projected column: a header and a [`Resource::lookup`] path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub path: &'static str,
}

impl Column {
    pub const fn new(header: &'static str, path: &'static str) -> Self {
        Self { header, path }
    }
}

impl Serialize for ProjectedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl TableOutput for ProjectedDocument {
    fn headers(&self) -> Vec<String> {
        if self.columns.is_empty() {
            return self.document.headers();
        }
        self.columns.iter().map(|c| c.header.to_string()).collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        if self.columns.is_empty() {
            return self.document.rows();
        }
        self.document
            .resources()
            .iter()
            .map(|resource| {
                self.columns
                    .iter()
                    .map(|c| resource.lookup(c.path).map(|v| format_value(&v)).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

impl TableOutput for Document {
    /// `type`, `id`, then every scalar attribute in name order.
    fn headers(&self) -> Vec<String> {
        let mut headers = vec!["type".to_string(), "id".to_string()];
        headers.extend(scalar_attribute_names(self.resources()));
        headers
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let names = scalar_attribute_names(self.resources());
        self.resources()
            .iter()
            .map(|resource| {
                let mut row = vec![resource.kind.clone(), resource.id.clone()];
                row.extend(
                    names
                        .iter()
                        .map(|name| resource.attributes.get(name).map(format_value).unwrap_or_default()),
                );
                row
            })
            .collect()
    }
}

fn scalar_attribute_names(resources: &[Resource]) -> Vec<String> {
    let mut names: Vec<String> = resources
        .iter()
        .flat_map(|r| {
            r.attributes
                .iter()
                .filter(|(_, v)| !v.is_object() && !v.is_array())
                .map(|(k, _)| k.clone())
        })
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Plain-text rendering of a JSON value for a table cell.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => {
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}

/// Prints a warning line to stderr.
pub fn print_warning(msg: &str) {
    use console::style;
    if console::Term::stderr().is_term() && console::colors_enabled_stderr() {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    } else {
        eprintln!("warning: {msg}");
    }
}

/// A stderr spinner, or `None` when stderr is not a terminal.
pub fn spinner(message: &str) -> Option<ProgressBar> {
    if !console::Term::stderr().is_term() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(bar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apps() -> Document {
        serde_json::from_value(json!({
            "data": [
                {"type": "apps", "id": "1", "attributes": {"name": "Sync", "bundleId": "com.example.sync", "nested": {"a": 1}}},
                {"type": "apps", "id": "2", "attributes": {"name": "Notes", "sku": "NOTES"}}
            ]
        }))
        .unwrap()
    }

    fn render<T: Serialize + TableOutput>(format: OutputFormat, pretty: bool, value: &T) -> String {
        let writer = OutputWriter::new(format, pretty).unwrap().with_color(false);
        let mut out = Vec::new();
        writer.write_to(&mut out, value).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(OutputFormat::parse("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(OutputFormat::parse("NDJSON").unwrap(), OutputFormat::Ndjson);
        assert!(matches!(OutputFormat::parse("yaml"), Err(AscError::Usage(_))));
    }

    #[test]
    fn test_pretty_requires_json() {
        let err = OutputWriter::new(OutputFormat::Table, true).unwrap_err();
        assert_eq!(err.to_string(), "--pretty is only valid with JSON output");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_compact_and_pretty_json() {
        let doc = Document::collection(Vec::new());
        assert_eq!(render(OutputFormat::Json, false, &doc), "{\"data\":[]}\n");
        let pretty = render(OutputFormat::Json, true, &apps());
        assert!(pretty.contains("\n  \"data\": ["));
    }

    #[test]
    fn test_ndjson_emits_one_line_per_resource() {
        let out = render(OutputFormat::Ndjson, false, &apps());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed["id"], "2");
    }

    #[test]
    fn test_document_table_uses_scalar_attributes() {
        let doc = apps();
        assert_eq!(doc.headers(), vec!["type", "id", "bundleId", "name", "sku"]);
        assert_eq!(doc.rows()[1], vec!["apps", "2", "", "Notes", "NOTES"]);
    }

    #[test]
    fn test_projection() {
        let projected = ProjectedDocument {
            document: apps(),
            columns: vec![Column::new("ID", "id"), Column::new("Name", "name")],
        };
        assert_eq!(projected.rows(), vec![vec!["1", "Sync"], vec!["2", "Notes"]]);
        let json = serde_json::to_value(&projected).unwrap();
        assert_eq!(json["data"][0]["attributes"]["bundleId"], "com.example.sync");
    }

    #[test]
    fn test_empty_table_keeps_headers() {
        let projected = ProjectedDocument {
            document: Document::collection(Vec::new()),
            columns: vec![Column::new("ID", "id"), Column::new("Name", "name")],
        };
        let out = render(OutputFormat::Table, false, &projected);
        assert!(out.contains("ID"));
        assert!(out.contains("Name"));
        let md = render(OutputFormat::Markdown, false, &projected);
        assert_eq!(md, "| ID | Name |\n| --- | --- |\n");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "");
        assert_eq!(format_value(&json!(["IOS", "MAC_OS"])), "IOS, MAC_OS");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!({"a": 1})), "{\"a\":1}");
    }
}
