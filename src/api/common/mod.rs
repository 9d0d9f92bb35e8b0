//
//  asc-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! JSON:API Response Model
//!
//! Every App Store Connect payload follows the JSON:API envelope:
//!
//! ```json
//! {
//!   "data": [{"type": "apps", "id": "123", "attributes": {...}, "relationships": {...}}],
//!   "included": [...],
//!   "links": {"self": "...", "next": "..."},
//!   "errors": [{"status": "404", "code": "NOT_FOUND", "title": "...", "detail": "..."}]
//! }
//! ```
//!
//! # Overview
//!
//! - [`Document`] - The envelope, with `data` as one resource, a list, or null
//! - [`Resource`] - `{type, id, attributes, relationships}`; `type` + `id` is the
//!   canonical primary key
//! - [`Linkage`] - the `{type, id}` reference stored inside a relationship
//! - [`ApiErrorItem`] - one entry of the `errors` list
//! - [`decode_response`] - status-aware decoding into a document or an [`AscError`]
//!
//! Attributes stay an opaque JSON map; the schema of each resource kind is
//! owned by whoever consumes it.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AscError;
use crate::util::truncate;

mod pagination;

pub use pagination::*;

/// Maximum characters of a raw error body kept in a synthetic error item.
const RAW_BODY_LIMIT: usize = 300;

/// A JSON:API document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "PrimaryData::is_absent")]
    pub data: PrimaryData,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorItem>,
}

impl Document {
    /// A collection document with the given resources.
    pub fn collection(resources: Vec<Resource>) -> Self {
        Self {
            data: PrimaryData::Many(resources),
            ..Default::default()
        }
    }

    /// Primary resources as a slice, whether `data` held one or many.
    pub fn resources(&self) -> &[Resource] {
        match &self.data {
            PrimaryData::Many(items) => items,
            PrimaryData::One(item) => std::slice::from_ref(item.as_ref()),
            PrimaryData::None => &[],
        }
    }

    /// Consumes the document, returning its primary resources.
    pub fn into_resources(self) -> Vec<Resource> {
        match self.data {
            PrimaryData::Many(items) => items,
            PrimaryData::One(item) => vec![*item],
            PrimaryData::None => Vec::new(),
        }
    }

    /// The single primary resource, if `data` was an object.
    pub fn single(&self) -> Option<&Resource> {
        match &self.data {
            PrimaryData::One(item) => Some(item),
            _ => None,
        }
    }

    /// True when `data` was a list.
    pub fn is_collection(&self) -> bool {
        matches!(self.data, PrimaryData::Many(_))
    }

    /// The `links.next` URL, ignoring blank values.
    pub fn next_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Looks up a side-loaded resource by `(type, id)`.
    pub fn find_included(&self, kind: &str, id: &str) -> Option<&Resource> {
        self.included.iter().find(|r| r.kind == kind && r.id == id)
    }
}

/// The primary `data` member: a list, a single resource, or absent/null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Box<Resource>),
    #[default]
    None,
}

impl PrimaryData {
    fn is_absent(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A single JSON:API resource object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Resource {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter, mostly for tests and request bodies.
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// A string attribute.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// A numeric attribute as `u64`.
    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attributes.get(name).and_then(Value::as_u64)
    }

    /// Follows a dotted path through nested attribute objects, e.g.
    /// `imageAsset.width`. `id` and `type` address the identity fields.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        match path {
            "id" => return Some(Value::String(self.id.clone())),
            "type" => return Some(Value::String(self.kind.clone())),
            _ => {}
        }

        if let Some(name) = path.strip_prefix("relationships.") {
            return self.related_id(name).map(|id| Value::String(id.to_string()));
        }

        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.attributes.get(first)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current.clone())
    }

    /// The linkage of a to-one relationship.
    pub fn related(&self, name: &str) -> Option<&ResourceIdentifier> {
        match self.relationships.get(name)?.data.as_ref()? {
            Linkage::One(id) => Some(id),
            Linkage::Many(ids) => ids.first(),
        }
    }

    /// The id of a to-one relationship.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        self.related(name).map(|r| r.id.as_str())
    }

    /// All linkages of a relationship (empty when absent).
    pub fn related_many(&self, name: &str) -> Vec<&ResourceIdentifier> {
        match self.relationships.get(name).and_then(|r| r.data.as_ref()) {
            Some(Linkage::One(id)) => vec![id],
            Some(Linkage::Many(ids)) => ids.iter().collect(),
            None => Vec::new(),
        }
    }

    /// The `(type, id)` primary key.
    pub fn key(&self) -> (&str, &str) {
        (&self.kind, &self.id)
    }
}

/// A relationship member of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Relationship linkage: a single reference or a list of references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

/// A compact `{type, id}` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Top-level `links` member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
}

/// One entry of a JSON:API `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// Where in the request an error originated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Decodes a response body according to its status code.
///
/// | Status | Result |
/// |--------|--------|
/// | 200-299 | the decoded [`Document`] (empty for an empty body) |
/// | 429 | [`AscError::RateLimited`] carrying `Retry-After` |
/// | 500-599 | [`AscError::Server`] |
/// | other | [`AscError::Api`] with every error item preserved |
///
/// An error body that is not JSON becomes a single synthetic item whose
/// `detail` is the truncated raw body.
pub fn decode_response(
    status: u16,
    retry_after: Option<Duration>,
    body: &[u8],
) -> Result<Document, AscError> {
    if (200..300).contains(&status) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        return serde_json::from_slice(body).map_err(|e| AscError::Decode(e.to_string()));
    }

    if status == 429 {
        return Err(AscError::RateLimited { retry_after });
    }

    let items = decode_error_items(status, body);
    if (500..600).contains(&status) {
        Err(AscError::Server { status, items })
    } else {
        Err(AscError::Api { status, items })
    }
}

/// Parses the `errors` list of an error body, or synthesizes one item from the
/// raw text.
pub fn decode_error_items(status: u16, body: &[u8]) -> Vec<ApiErrorItem> {
    if let Ok(document) = serde_json::from_slice::<Document>(body) {
        if !document.errors.is_empty() {
            return document.errors;
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    vec![ApiErrorItem {
        status: Some(status.to_string()),
        detail: (!raw.is_empty()).then(|| truncate(raw, RAW_BODY_LIMIT)),
        ..Default::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_collection_with_relationships() {
        let body = json!({
            "data": [{
                "type": "builds",
                "id": "b1",
                "attributes": {"version": "42", "processingState": "VALID"},
                "relationships": {"app": {"data": {"type": "apps", "id": "a1"}}}
            }],
            "links": {"self": "https://api.appstoreconnect.apple.com/v1/builds", "next": ""}
        });
        let doc = decode_response(200, None, body.to_string().as_bytes()).unwrap();
        assert!(doc.is_collection());
        assert_eq!(doc.resources().len(), 1);
        let build = &doc.resources()[0];
        assert_eq!(build.attr_str("processingState"), Some("VALID"));
        assert_eq!(build.related_id("app"), Some("a1"));
        assert_eq!(doc.next_url(), None);
    }

    #[test]
    fn test_decode_single_and_null() {
        let doc = decode_response(200, None, br#"{"data":{"type":"apps","id":"1"}}"#).unwrap();
        assert_eq!(doc.single().map(|r| r.id.as_str()), Some("1"));

        let doc = decode_response(200, None, br#"{"data":null}"#).unwrap();
        assert!(doc.resources().is_empty());

        let doc = decode_response(204, None, b"").unwrap();
        assert!(doc.resources().is_empty());
    }

    #[test]
    fn test_decode_api_errors_preserves_items() {
        let body = json!({"errors": [
            {"status": "409", "code": "ENTITY_ERROR", "title": "Invalid", "detail": "bad locale",
             "source": {"pointer": "/data/attributes/locale"}},
            {"status": "409", "code": "ENTITY_ERROR.2", "title": "Second"}
        ]});
        let err = decode_response(409, None, body.to_string().as_bytes()).unwrap_err();
        match err {
            AscError::Api { status, items } => {
                assert_eq!(status, 409);
                assert_eq!(items.len(), 2);
                assert_eq!(
                    items[0].source.as_ref().and_then(|s| s.pointer.as_deref()),
                    Some("/data/attributes/locale")
                );
                assert_eq!(items[1].code.as_deref(), Some("ENTITY_ERROR.2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let body = "<html>".to_string() + &"x".repeat(1000) + "</html>";
        let err = decode_response(403, None, body.as_bytes()).unwrap_err();
        match err {
            AscError::Api { status, items } => {
                assert_eq!(status, 403);
                assert_eq!(items.len(), 1);
                let detail = items[0].detail.as_deref().unwrap();
                assert!(detail.starts_with("<html>"));
                assert!(detail.chars().count() <= RAW_BODY_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rate_limit_and_server_error() {
        let err = decode_response(429, Some(Duration::from_secs(3)), b"{}").unwrap_err();
        assert!(matches!(err, AscError::RateLimited { retry_after: Some(d) } if d.as_secs() == 3));

        let err = decode_response(503, None, b"unavailable").unwrap_err();
        assert!(matches!(err, AscError::Server { status: 503, .. }));
    }

    #[test]
    fn test_compact_json_round_trip_keeps_attributes() {
        let resource = Resource::new("appStoreVersions", "v1")
            .with_attribute("versionString", "1.2.3")
            .with_attribute("downloadable", true)
            .with_attribute("nested", json!({"a": [1, 2, {"b": null}]}));
        let encoded = serde_json::to_string(&Document::collection(vec![resource.clone()])).unwrap();
        let decoded: Document = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.resources()[0].attributes, resource.attributes);
    }

    #[test]
    fn test_lookup_paths() {
        let mut resource = Resource::new("appScreenshots", "s1")
            .with_attribute("imageAsset", json!({"width": 1242, "height": 2688}));
        resource.relationships.insert(
            "appScreenshotSet".into(),
            Relationship {
                data: Some(Linkage::One(ResourceIdentifier::new("appScreenshotSets", "set-1"))),
                ..Default::default()
            },
        );
        assert_eq!(resource.lookup("imageAsset.width"), Some(json!(1242)));
        assert_eq!(resource.lookup("id"), Some(json!("s1")));
        assert_eq!(resource.lookup("relationships.appScreenshotSet"), Some(json!("set-1")));
        assert_eq!(resource.lookup("missing"), None);
    }

    #[test]
    fn test_empty_collection_serializes_data_array() {
        let doc = Document::collection(Vec::new());
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"data":[]}"#);
    }
}
