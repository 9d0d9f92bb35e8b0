//
//  asc-cli
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Resource Resolution
//!
//! Turns the identifiers people type (`com.example.sync`, `"Sync Pro"`,
//! `1.4.0`, build `512`) into App Store Connect resource IDs.
//!
//! App identifiers go through a cascade that stops at the first definite
//! answer:
//!
//! 1. all digits: used as the resource ID
//! 2. `filter[bundleId]` lookup
//! 3. an exact name match among the `filter[name]` results
//! 4. an exact name match over a full scan of `/v1/apps`
//! 5. a single `filter[name]` result, even when its name differs
//!
//! Two exact matches at step 3 or 4 are an ambiguity, as are two
//! `filter[name]` results at step 5.
//!
//! Positive answers are cached for the rest of the invocation.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use crate::api::{AscClient, Paginator, RequestDescriptor, Resource};
use crate::error::AscError;

use super::{Platform, MAX_LIMIT};

/// Entries kept by the per-invocation cache.
const CACHE_CAPACITY: usize = 64;

/// Processing states a build number may resolve to.
const BUILD_STATES: &str = "PROCESSING,FAILED,INVALID,VALID";

/// An app identifier as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppIdentifier {
    /// All digits: already a resource ID.
    Numeric(String),
    /// Reverse-DNS looking value, e.g. `com.example.sync`.
    BundleId(String),
    /// Anything else, looked up by app name.
    Name(String),
}

impl AppIdentifier {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            Self::Numeric(raw.to_string())
        } else if raw.contains('.') && !raw.contains(char::is_whitespace) {
            Self::BundleId(raw.to_string())
        } else {
            Self::Name(raw.to_string())
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Numeric(v) | Self::BundleId(v) | Self::Name(v) => v,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

impl fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    App,
    Build,
    Version,
}

/// What to resolve a build from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildQuery {
    pub build_id: Option<String>,
    pub build_number: Option<String>,
    pub app_id: Option<String>,
    pub platform: Option<Platform>,
}

impl BuildQuery {
    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.build_id.as_deref().unwrap_or_default(),
            self.build_number.as_deref().unwrap_or_default(),
            self.app_id.as_deref().unwrap_or_default(),
            self.platform.map(|p| p.as_api_str()).unwrap_or_default()
        )
    }
}

/// What to resolve an App Store version from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionQuery {
    pub version_id: Option<String>,
    pub version: Option<String>,
    pub app_id: Option<String>,
    pub platform: Option<Platform>,
}

impl VersionQuery {
    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.version_id.as_deref().unwrap_or_default(),
            self.version.as_deref().unwrap_or_default(),
            self.app_id.as_deref().unwrap_or_default(),
            self.platform.map(|p| p.as_api_str()).unwrap_or_default()
        )
    }
}

/// Small LRU map of resolved resources.
#[derive(Debug)]
struct ResolverCache {
    capacity: usize,
    order: VecDeque<(ResourceKind, String)>,
    entries: HashMap<(ResourceKind, String), Resource>,
}

impl ResolverCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, key: &(ResourceKind, String)) -> Option<Resource> {
        let hit = self.entries.get(key).cloned()?;
        self.order.retain(|k| k != key);
        self.order.push_back(key.clone());
        Some(hit)
    }

    fn insert(&mut self, key: (ResourceKind, String), value: Resource) {
        if self.entries.insert(key.clone(), value).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
    }
}

/// Resolves user identifiers against App Store Connect.
#[derive(Debug)]
pub struct ResourceResolver {
    client: AscClient,
    confirm_numeric: bool,
    cache: Mutex<ResolverCache>,
}

impl ResourceResolver {
    pub fn new(client: AscClient) -> Self {
        Self {
            client,
            confirm_numeric: false,
            cache: Mutex::new(ResolverCache::new(CACHE_CAPACITY)),
        }
    }

    /// Confirm numeric app IDs with `GET /v1/apps/{id}` instead of trusting
    /// them.
    pub fn with_confirm_numeric(mut self, confirm: bool) -> Self {
        self.confirm_numeric = confirm;
        self
    }

    pub fn client(&self) -> &AscClient {
        &self.client
    }

    fn cached(&self, kind: ResourceKind, raw: &str) -> Option<Resource> {
        self.cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(&(kind, raw.to_string())))
    }

    fn remember(&self, kind: ResourceKind, raw: &str, resource: &Resource) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert((kind, raw.to_string()), resource.clone());
        }
    }

    /// Resolves an app identifier to its resource ID.
    ///
    /// # Errors
    ///
    /// - [`AscError::Ambiguity`] when a lookup matches several apps
    /// - [`AscError::NotFound`] when every step of the cascade misses
    pub async fn resolve_app(&self, raw: &str) -> Result<String, AscError> {
        let ident = AppIdentifier::parse(raw);
        if ident.raw().is_empty() {
            return Err(AscError::usage("--app is required"));
        }
        if let Some(hit) = self.cached(ResourceKind::App, ident.raw()) {
            return Ok(hit.id);
        }

        let app = self.lookup_app(&ident).await?;
        tracing::debug!(input = %ident, app_id = %app.id, "resolved app");
        self.remember(ResourceKind::App, ident.raw(), &app);
        Ok(app.id)
    }

    async fn lookup_app(&self, ident: &AppIdentifier) -> Result<Resource, AscError> {
        let value = ident.raw();

        if let AppIdentifier::Numeric(id) = ident {
            if !self.confirm_numeric {
                return Ok(Resource::new("apps", id.clone()));
            }
            let doc = self.client.send(&RequestDescriptor::get(format!("/v1/apps/{id}"))).await?;
            return doc
                .single()
                .cloned()
                .ok_or_else(|| not_found_app(value));
        }

        let mut by_bundle = self.list_apps("filter[bundleId]", value).await?;
        match by_bundle.len() {
            1 => return Ok(by_bundle.remove(0)),
            0 => {}
            _ => {
                return Err(AscError::Ambiguity(format!(
                    "multiple apps found for bundle ID {value:?}"
                )))
            }
        }

        let mut by_name = self.list_apps("filter[name]", value).await?;
        if let Some(app) = single_exact(&by_name, value)? {
            return Ok(app);
        }

        // Some servers ignore or fuzz filter[name]; compare names ourselves.
        let all = Paginator::new(&self.client)
            .paginate_all(
                &RequestDescriptor::get("/v1/apps")
                    .query("fields[apps]", "name,bundleId")
                    .query("limit", MAX_LIMIT.to_string()),
            )
            .await?
            .into_resources();
        if let Some(app) = single_exact(&all, value)? {
            return Ok(app);
        }

        // Legacy behavior: a unique filter[name] hit is accepted as is.
        match by_name.len() {
            0 => Err(not_found_app(value)),
            1 => Ok(by_name.remove(0)),
            _ => Err(ambiguous_name(value)),
        }
    }

    async fn list_apps(&self, filter: &str, value: &str) -> Result<Vec<Resource>, AscError> {
        let req = RequestDescriptor::get("/v1/apps")
            .query(filter, value)
            .query("limit", "2");
        Ok(self.client.send(&req).await?.into_resources())
    }

    /// Resolves a build from `--build`, or from `--build-number` within an app.
    ///
    /// The newest upload wins when the same number exists more than once.
    pub async fn resolve_build(&self, query: &BuildQuery) -> Result<String, AscError> {
        if let Some(id) = query.build_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(id.to_string());
        }

        let number = query
            .build_number
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AscError::usage("--build or --build-number is required"))?;
        let app_id = query
            .app_id
            .as_deref()
            .ok_or_else(|| AscError::usage("--app is required with --build-number"))?;

        let key = query.cache_key();
        if let Some(hit) = self.cached(ResourceKind::Build, &key) {
            return Ok(hit.id);
        }

        let mut req = RequestDescriptor::get("/v1/builds")
            .query("filter[app]", app_id)
            .query("filter[version]", number);
        if let Some(platform) = query.platform {
            req = req.query("filter[preReleaseVersion.platform]", platform.as_api_str());
        }
        let req = req
            .query("filter[processingState]", BUILD_STATES)
            .query("sort", "-uploadedDate")
            .query("limit", "1");

        let build = self
            .client
            .send(&req)
            .await?
            .into_resources()
            .into_iter()
            .next()
            .ok_or_else(|| {
                AscError::NotFound(format!("build {number:?} not found for app {app_id}"))
            })?;

        self.remember(ResourceKind::Build, &key, &build);
        Ok(build.id)
    }

    /// Resolves an App Store version from `--version-id`, or from
    /// `--version` (plus `--platform` when the string exists on several).
    pub async fn resolve_version(&self, query: &VersionQuery) -> Result<Resource, AscError> {
        let key = query.cache_key();
        if let Some(hit) = self.cached(ResourceKind::Version, &key) {
            return Ok(hit);
        }

        let version = if let Some(id) = query.version_id.as_deref().filter(|v| !v.trim().is_empty()) {
            self.client
                .send(&RequestDescriptor::get(format!("/v1/appStoreVersions/{}", id.trim())))
                .await?
                .single()
                .cloned()
                .ok_or_else(|| AscError::NotFound(format!("app store version {id:?} not found")))?
        } else {
            self.find_version(query).await?
        };

        self.remember(ResourceKind::Version, &key, &version);
        Ok(version)
    }

    async fn find_version(&self, query: &VersionQuery) -> Result<Resource, AscError> {
        let version = query
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AscError::usage("--version or --version-id is required"))?;
        let app_id = query
            .app_id
            .as_deref()
            .ok_or_else(|| AscError::usage("--app is required with --version"))?;

        let mut req = RequestDescriptor::get(format!("/v1/apps/{app_id}/appStoreVersions"))
            .query("filter[versionString]", version);
        if let Some(platform) = query.platform {
            req = req.query("filter[platform]", platform.as_api_str());
        }
        let req = req.query("limit", MAX_LIMIT.to_string());

        let mut candidates = self.client.send(&req).await?.into_resources();
        match candidates.len() {
            0 => Err(AscError::NotFound(format!(
                "app store version {version:?} not found for app {app_id}"
            ))),
            1 => Ok(candidates.remove(0)),
            _ => {
                let listed: Vec<String> = candidates
                    .iter()
                    .map(|v| format!("{}:{}", v.attr_str("platform").unwrap_or("?"), v.id))
                    .collect();
                Err(AscError::Ambiguity(format!(
                    "multiple app store versions found for version {version:?} ({}); use --platform or --version-id",
                    listed.join(", ")
                )))
            }
        }
    }
}

/// The one app named exactly `value`, if any. Several is an ambiguity.
fn single_exact(apps: &[Resource], value: &str) -> Result<Option<Resource>, AscError> {
    let exact: Vec<&Resource> = apps
        .iter()
        .filter(|app| app.attr_str("name").map(str::trim) == Some(value))
        .collect();
    match exact.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some((*single).clone())),
        _ => Err(ambiguous_name(value)),
    }
}

fn ambiguous_name(value: &str) -> AscError {
    AscError::Ambiguity(format!("multiple apps found for name {value:?}"))
}

fn not_found_app(value: &str) -> AscError {
    AscError::NotFound(format!(
        "app {value:?} not found (expected app ID, bundle ID, or exact app name)"
    ))
}
