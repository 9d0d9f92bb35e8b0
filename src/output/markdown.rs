//
//  asc-cli
//  output/markdown.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Markdown output: `**Label:** value` lines and pipe tables.

use super::TableOutput;
use crate::util::sanitize_cell;

/// Longest cell rendered before truncation.
pub const MAX_MD_CELL_WIDTH: usize = 80;

/// Formats text as bold.
pub fn md_bold(text: &str) -> String {
    format!("**{text}**")
}

/// Builds a pipe table. Cells are escaped and truncated.
pub fn md_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let escape = |cells: &[String]| -> String {
        cells
            .iter()
            .map(|c| sanitize_cell(c, MAX_MD_CELL_WIDTH))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut result = String::new();
    result.push_str(&format!("| {} |\n", escape(headers)));
    result.push_str(&format!(
        "| {} |\n",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    ));
    for row in rows {
        result.push_str(&format!("| {} |\n", escape(row)));
    }
    result
}

/// Renders a result: bold label lines for its fields, then a pipe table.
pub fn render_markdown<T: TableOutput + ?Sized>(value: &T) -> String {
    let mut out = String::new();

    let fields = value.fields();
    for (label, text) in &fields {
        out.push_str(&format!(
            "{} {}\n",
            md_bold(&format!("{label}:")),
            sanitize_cell(text, MAX_MD_CELL_WIDTH)
        ));
    }

    let headers = value.headers();
    if headers.is_empty() {
        return out;
    }
    if !fields.is_empty() {
        out.push('\n');
    }
    out.push_str(&md_table(&headers, &value.rows()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plan;

    impl TableOutput for Plan {
        fn fields(&self) -> Vec<(String, String)> {
            vec![("App ID".to_string(), "123".to_string())]
        }

        fn headers(&self) -> Vec<String> {
            vec!["change".to_string(), "to".to_string()]
        }

        fn rows(&self) -> Vec<Vec<String>> {
            vec![vec!["add".to_string(), "a|b\nc".to_string()]]
        }
    }

    #[test]
    fn test_render_markdown() {
        let out = render_markdown(&Plan);
        assert_eq!(
            out,
            "**App ID:** 123\n\n| change | to |\n| --- | --- |\n| add | a\\|b\\nc |\n"
        );
    }

    #[test]
    fn test_md_table_truncates() {
        let rows = vec![vec!["y".repeat(120)]];
        let table = md_table(&["h".to_string()], &rows);
        assert!(table.contains(&format!("{}...", "y".repeat(77))));
    }
}
