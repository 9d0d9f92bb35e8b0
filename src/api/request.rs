//
//  asc-cli
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Request Descriptors
//!
//! A [`RequestDescriptor`] is the transport-neutral description of one API
//! call: `{method, path, query, headers, body, accept}`. Endpoint bindings,
//! the resolver and the reconciliation engine all produce descriptors; only
//! the [`AscClient`](super::AscClient) turns them into HTTP.
//!
//! Paths are either relative (`/v1/apps`) and joined onto the client's base
//! URL, or absolute (a `links.next` URL) and used as-is.

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::AscError;

/// Description of a single App Store Connect request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub accept: Option<String>,
}

impl RequestDescriptor {
    /// A descriptor with the given method and path and nothing else.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            accept: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter. Later values for the same key are kept as
    /// separate pairs.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a query parameter, replacing any previous value for the key.
    pub fn set_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Returns the first value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Whether the transport may retry this request on transient failures.
    ///
    /// GET and HEAD always are. DELETE is only for relationship endpoints,
    /// where removing an already-removed link is a no-op.
    pub fn is_idempotent(&self) -> bool {
        match self.method {
            Method::GET | Method::HEAD => true,
            Method::DELETE => self.path.contains("/relationships/"),
            _ => false,
        }
    }

    /// Builds the full URL against `base`.
    pub fn url(&self, base: &Url) -> Result<Url, AscError> {
        let mut url = if self.path.starts_with("http://") || self.path.starts_with("https://") {
            Url::parse(&self.path)
        } else {
            base.join(&self.path)
        }
        .map_err(|e| AscError::usage(format!("invalid request path {:?}: {e}", self.path)))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Fills `{name}` placeholders in a path template.
///
/// # Errors
///
/// - [`AscError::Usage`] when a placeholder has no value
/// - [`AscError::Validation`] when a value would escape its path segment
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use asc_cli::api::fill_path_template;
///
/// let mut params = BTreeMap::new();
/// params.insert("app".to_string(), "123".to_string());
/// assert_eq!(
///     fill_path_template("/v1/apps/{app}/builds", &params).unwrap(),
///     "/v1/apps/123/builds"
/// );
/// ```
pub fn fill_path_template(
    template: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, AscError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| AscError::Internal(format!("unterminated placeholder in {template}")))?;
        let name = &after[..end];
        let value = params
            .get(name)
            .ok_or_else(|| AscError::usage(format!("--{name} is required")))?;
        if value.is_empty() || value.contains(['/', '?', '#']) || value == "." || value == ".." {
            return Err(AscError::validation(format!("invalid value {value:?} for --{name}")));
        }
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.appstoreconnect.apple.com").unwrap()
    }

    #[test]
    fn test_url_encodes_filters() {
        let req = RequestDescriptor::get("/v1/apps")
            .query("filter[bundleId]", "com.example.sync")
            .query("limit", "2");
        let url = req.url(&base()).unwrap();
        assert_eq!(url.path(), "/v1/apps");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[bundleId]".to_string(), "com.example.sync".to_string()),
                ("limit".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let req = RequestDescriptor::get("https://api.appstoreconnect.apple.com/v1/apps?cursor=AQ");
        let url = req.url(&base()).unwrap();
        assert_eq!(url.query(), Some("cursor=AQ"));
    }

    #[test]
    fn test_idempotency() {
        assert!(RequestDescriptor::get("/v1/apps").is_idempotent());
        assert!(!RequestDescriptor::post("/v1/betaGroups", Value::Null).is_idempotent());
        assert!(!RequestDescriptor::delete("/v1/appInfoLocalizations/1").is_idempotent());
        assert!(RequestDescriptor::delete("/v1/betaGroups/1/relationships/builds").is_idempotent());
    }

    #[test]
    fn test_set_query_replaces() {
        let req = RequestDescriptor::get("/v1/apps")
            .query("limit", "50")
            .set_query("limit", "200");
        assert_eq!(req.query_value("limit"), Some("200"));
        assert_eq!(req.query.len(), 1);
    }

    #[test]
    fn test_fill_path_template() {
        let mut params = BTreeMap::new();
        params.insert("subscription-id".to_string(), "sub-1".to_string());
        assert_eq!(
            fill_path_template("/v1/subscriptions/{subscription-id}/pricePoints", &params).unwrap(),
            "/v1/subscriptions/sub-1/pricePoints"
        );

        let err = fill_path_template("/v1/apps/{app}", &params).unwrap_err();
        assert!(matches!(err, AscError::Usage(ref m) if m == "--app is required"));

        params.insert("app".to_string(), "../x".to_string());
        assert!(matches!(
            fill_path_template("/v1/apps/{app}", &params),
            Err(AscError::Validation(_))
        ));
    }
}
