//
//  asc-cli
//  api/debug.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Request/response tracing for `--api-debug`.
//!
//! Lines go to the `asc::http` tracing target. Only a fixed allow-list of
//! header values is printed; everything else shows as `***`.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::util::{format_duration, truncate};

const VISIBLE_HEADERS: &[&str] = &[
    "content-type",
    "accept",
    "user-agent",
    "retry-after",
    "x-rate-limit",
    "content-length",
];

const BODY_LIMIT: usize = 2048;

/// Redacts one header value.
pub fn redact_header(name: &str, value: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower == "authorization" {
        return match value.split_once(' ') {
            Some((scheme, _)) => format!("{scheme} ***"),
            None => "***".to_string(),
        };
    }
    if VISIBLE_HEADERS.contains(&lower.as_str()) {
        value.to_string()
    } else {
        "***".to_string()
    }
}

/// Formats a header map as `name: value` pairs with redaction applied.
pub fn format_headers(headers: &HeaderMap) -> String {
    let mut pairs: Vec<String> = headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            format!("{}: {}", name.as_str(), redact_header(name.as_str(), value))
        })
        .collect();
    pairs.sort();
    pairs.join(", ")
}

pub(crate) fn log_request(request: &reqwest::Request) {
    tracing::info!(
        target: "asc::http",
        "--> {} {} [{}]",
        request.method(),
        request.url(),
        format_headers(request.headers())
    );
    if let Some(body) = request.body().and_then(|b| b.as_bytes()) {
        tracing::info!(target: "asc::http", "--> body {}", preview(body));
    }
}

pub(crate) fn log_response(status: u16, headers: &HeaderMap, body: &[u8], elapsed: Duration) {
    tracing::info!(
        target: "asc::http",
        "<-- {} in {} [{}]",
        status,
        format_duration(elapsed),
        format_headers(headers)
    );
    if !body.is_empty() {
        tracing::info!(target: "asc::http", "<-- body {}", preview(body));
    }
}

fn preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => truncate(text.trim(), BODY_LIMIT),
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};

    #[test]
    fn test_authorization_is_masked() {
        assert_eq!(redact_header("Authorization", "Bearer eyJhbGciOi.x.y"), "Bearer ***");
        assert_eq!(redact_header("authorization", "opaque"), "***");
    }

    #[test]
    fn test_allow_list() {
        assert_eq!(redact_header("Content-Type", "application/json"), "application/json");
        assert_eq!(redact_header("X-Request-Id", "abc"), "***");
    }

    #[test]
    fn test_format_headers_never_leaks_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret-token"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(SET_COOKIE, HeaderValue::from_static("session=abc"));
        let line = format_headers(&headers);
        assert!(!line.contains("secret-token"));
        assert!(!line.contains("session=abc"));
        assert!(line.contains("content-type: application/json"));
    }

    #[test]
    fn test_preview_truncates_and_handles_binary() {
        let long = "x".repeat(BODY_LIMIT * 2);
        assert!(preview(long.as_bytes()).len() <= BODY_LIMIT);
        assert_eq!(preview(&[0x1f, 0x8b, 0xff]), "<3 bytes of binary data>");
    }
}
