//
//  asc-cli
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small helpers shared across the CLI: duration parsing and formatting for
//! `--timeout`, comma-separated flag values, and string truncation for
//! tables and error messages.

use std::time::Duration;

use crate::error::AscError;

/// Formats a duration as a short human-readable string.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use asc_cli::util::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Parses a duration such as `90s`, `2m`, `1h`, `500ms` or a bare number of
/// seconds.
///
/// # Errors
///
/// Returns [`AscError::Validation`] for empty, negative, zero or unparseable
/// values.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use asc_cli::util::parse_duration;
///
/// assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, AscError> {
    let s = s.trim();
    let invalid = || AscError::validation(format!("invalid duration {s:?} (expected e.g. 90s, 2m, 500ms)"));

    if s.is_empty() {
        return Err(invalid());
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().map_err(|_| invalid())?;

    let secs = match unit.trim() {
        "" | "s" | "sec" | "secs" => value,
        "ms" => value / 1000.0,
        "m" | "min" | "mins" => value * 60.0,
        "h" | "hr" | "hrs" => value * 3600.0,
        _ => return Err(invalid()),
    };

    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }

    Ok(Duration::from_secs_f64(secs))
}

/// Splits a comma-separated flag value, trimming entries and dropping empties.
///
/// ```rust
/// use asc_cli::util::split_csv;
///
/// assert_eq!(split_csv(" IOS, MAC_OS,,"), vec!["IOS", "MAC_OS"]);
/// ```
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Truncates a string to at most `max_len` characters, appending `...` when
/// it was cut.
///
/// Counts characters rather than bytes so multi-byte locales are never split.
///
/// ```rust
/// use asc_cli::util::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// ```
pub fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Makes a value safe for a single table or markdown cell: newlines become
/// the two-character sequence `\n`, pipes are escaped, and the result is
/// truncated to `max_len` characters.
pub fn sanitize_cell(value: &str, max_len: usize) -> String {
    let escaped = value
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('|', "\\|");
    truncate(&escaped, max_len)
}

/// Reads an environment variable, treating blank values as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("short", 3), "sho");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration(" 30 ").unwrap(), Duration::from_secs(30));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m 0s");
        assert_eq!(format_duration(Duration::from_millis(200)), "200ms");
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a,b , c"), vec!["a", "b", "c"]);
        assert!(split_csv(" , ").is_empty());
    }

    #[test]
    fn test_sanitize_cell() {
        assert_eq!(sanitize_cell("line one\nline two", 80), "line one\\nline two");
        assert_eq!(sanitize_cell("a|b", 80), "a\\|b");
        let long = "x".repeat(100);
        let cell = sanitize_cell(&long, 80);
        assert_eq!(cell.chars().count(), 80);
        assert!(cell.ends_with("..."));
    }
}
