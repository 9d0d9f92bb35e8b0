//
//  asc-cli
//  metadata/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Metadata Reconciliation
//!
//! Compares localized metadata kept in a directory against App Store Connect
//! and produces a deterministic plan of adds, updates and deletes, optionally
//! applying it.
//!
//! ## Directory Layout
//!
//! ```text
//! metadata/
//! ├── app-info/
//! │   ├── default.json      # seeds every remote locale without its own file
//! │   └── en-US.json
//! └── version/
//!     └── 1.4.0/
//!         ├── en-US.json
//!         └── de-DE.json
//! ```
//!
//! Each file is a flat JSON object of string fields; see [`APP_INFO_FIELDS`]
//! and [`VERSION_FIELDS`].

mod apply;
mod diff;
mod local;
mod plan;
mod remote;

pub use apply::*;
pub use diff::*;
pub use local::*;
pub use plan::*;
pub use remote::*;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::api::AscClient;
use crate::context::{Platform, ResourceResolver, VersionQuery};
use crate::error::AscError;
use crate::output::TableOutput;

/// File name of the fallback locale.
pub const DEFAULT_LOCALE: &str = "default";

pub const APP_INFO_FIELDS: &[&str] = &[
    "name",
    "privacyChoicesUrl",
    "privacyPolicyText",
    "privacyPolicyUrl",
    "subtitle",
];

pub const VERSION_FIELDS: &[&str] = &[
    "description",
    "keywords",
    "marketingUrl",
    "promotionalText",
    "supportUrl",
    "whatsNew",
];

const MAX_LOCALE_LEN: usize = 20;

static LOCALE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]+)*$").expect("locale pattern is valid"));

/// Field name to trimmed, non-empty value.
pub type FieldMap = BTreeMap<String, String>;

/// Locale to its fields.
pub type LocaleFields = BTreeMap<String, FieldMap>;

/// The two kinds of localized metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    AppInfo,
    Version,
}

impl Scope {
    /// Directory name, also used in plan keys and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppInfo => "app-info",
            Self::Version => "version",
        }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::AppInfo => APP_INFO_FIELDS,
            Self::Version => VERSION_FIELDS,
        }
    }

    /// JSON:API type of the localization resources.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::AppInfo => "appInfoLocalizations",
            Self::Version => "appStoreVersionLocalizations",
        }
    }

    /// Relationship name and type linking a localization to its parent.
    pub fn parent_relationship(&self) -> (&'static str, &'static str) {
        match self {
            Self::AppInfo => ("appInfo", "appInfos"),
            Self::Version => ("appStoreVersion", "appStoreVersions"),
        }
    }

    /// Parses an `--include` value.
    pub fn parse_includes(value: &str) -> Result<Vec<Scope>, AscError> {
        let mut scopes = Vec::new();
        for item in crate::util::split_csv(value) {
            let parsed: &[Scope] = match item.as_str() {
                "app-info" => &[Scope::AppInfo],
                "version" => &[Scope::Version],
                "localizations" => &[Scope::AppInfo, Scope::Version],
                other => {
                    return Err(AscError::usage(format!(
                        "--include: unsupported value {other:?} (expected app-info, version or localizations)"
                    )))
                }
            };
            scopes.extend_from_slice(parsed);
        }
        scopes.sort();
        scopes.dedup();
        if scopes.is_empty() {
            return Err(AscError::usage("--include requires at least one scope"));
        }
        Ok(scopes)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Checks a locale name such as `en-US` or `zh-Hans`.
pub fn validate_locale(locale: &str) -> Result<String, AscError> {
    let locale = locale.trim();
    if locale.is_empty() {
        return Err(AscError::validation("locale is required"));
    }
    if locale.len() > MAX_LOCALE_LEN {
        return Err(AscError::validation(format!("locale {locale:?} is too long")));
    }
    if locale == DEFAULT_LOCALE || LOCALE_PATTERN.is_match(locale) {
        Ok(locale.to_string())
    } else {
        Err(AscError::validation(format!("invalid locale {locale:?}")))
    }
}

/// Checks a value used as one directory name, such as a version string.
pub fn validate_path_segment(label: &str, value: &str) -> Result<String, AscError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AscError::usage(format!("--{label} is required")));
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(AscError::usage(format!("invalid {label} {value:?}")));
    }
    Ok(value.to_string())
}

/// Inputs of `metadata push`.
#[derive(Debug, Clone)]
pub struct PushOptions {
    pub app_id: String,
    pub version: String,
    pub platform: Option<Platform>,
    pub dir: PathBuf,
    pub includes: Vec<Scope>,
    pub dry_run: bool,
    pub allow_deletes: bool,
    pub confirm: bool,
}

/// Result of `metadata push`, rendered in every output format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResult {
    pub app_id: String,
    pub app_info_id: String,
    pub version: String,
    pub version_id: String,
    pub dir: String,
    pub dry_run: bool,
    pub applied: bool,
    pub includes: Vec<Scope>,
    pub adds: Vec<PlanItem>,
    pub updates: Vec<PlanItem>,
    pub deletes: Vec<PlanItem>,
    pub api_calls: Vec<ApiCall>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ApplyAction>,
}

impl TableOutput for PushResult {
    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("App ID".to_string(), self.app_id.clone()),
            ("App Info ID".to_string(), self.app_info_id.clone()),
            ("Version".to_string(), self.version.clone()),
            ("Version ID".to_string(), self.version_id.clone()),
            ("Dir".to_string(), self.dir.clone()),
            ("Dry Run".to_string(), self.dry_run.to_string()),
        ];
        if self.applied {
            fields.push(("Applied".to_string(), "true".to_string()));
        }
        if !self.api_calls.is_empty() {
            let calls: Vec<String> = self
                .api_calls
                .iter()
                .map(|c| format!("{} {} x{}", c.scope, c.operation, c.count))
                .collect();
            fields.push(("API Calls".to_string(), calls.join(", ")));
        }
        if !self.actions.is_empty() {
            let actions: Vec<String> = self
                .actions
                .iter()
                .map(|a| format!("{} {} {}", a.action, a.scope, a.locale))
                .collect();
            fields.push(("Actions".to_string(), actions.join(", ")));
        }
        fields
    }

    fn headers(&self) -> Vec<String> {
        plan_headers()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        plan_rows(&self.adds, &self.updates, &self.deletes)
    }
}

/// Runs `metadata push`: load, snapshot, plan, then apply unless dry-run.
///
/// Local files are read before any request so schema problems surface
/// first. Guardrails run after the snapshot so ambiguity diagnostics can
/// name the candidates.
pub async fn push(
    client: &AscClient,
    resolver: &ResourceResolver,
    opts: &PushOptions,
) -> Result<PushResult, AscError> {
    let version = validate_path_segment("version", &opts.version)?;
    let local = load_local_metadata(&opts.dir, &version, &opts.includes)?;

    let query = VersionQuery {
        version: Some(version.clone()),
        app_id: Some(opts.app_id.clone()),
        platform: opts.platform,
        ..Default::default()
    };
    let snapshot = fetch_snapshot(client, resolver, &opts.app_id, &query, &opts.includes).await?;

    let effective = local.effective(&snapshot, opts.allow_deletes);
    let plan = Plan::build(&effective, &snapshot, &version, &opts.includes);

    let mut result = PushResult {
        app_id: opts.app_id.clone(),
        app_info_id: snapshot.app_info_id.clone(),
        version: version.clone(),
        version_id: snapshot.version_id.clone(),
        dir: opts.dir.display().to_string(),
        dry_run: opts.dry_run,
        applied: false,
        includes: opts.includes.clone(),
        adds: plan.adds.clone(),
        updates: plan.updates.clone(),
        deletes: plan.deletes.clone(),
        api_calls: plan.api_calls.clone(),
        actions: Vec::new(),
    };

    if opts.dry_run {
        return Ok(result);
    }

    check_guardrails(&plan, opts.allow_deletes, opts.confirm)?;

    result.actions = apply_plan(client, &effective, &snapshot, &version, &opts.includes, opts.allow_deletes).await?;
    result.applied = true;
    Ok(result)
}

/// Refuses to apply deletes without both `--allow-deletes` and `--confirm`.
pub fn check_guardrails(plan: &Plan, allow_deletes: bool, confirm: bool) -> Result<(), AscError> {
    if plan.deletes.is_empty() {
        return Ok(());
    }
    if !allow_deletes {
        return Err(AscError::usage("--allow-deletes is required to apply delete operations"));
    }
    if !confirm {
        return Err(AscError::usage("--confirm is required when applying delete operations"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use mockito::Matcher;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_locale_validation() {
        assert_eq!(validate_locale("en-US").unwrap(), "en-US");
        assert_eq!(validate_locale("zh-Hans-CN").unwrap(), "zh-Hans-CN");
        assert_eq!(validate_locale("default").unwrap(), "default");
        assert!(validate_locale("e").is_err());
        assert!(validate_locale("en_US").is_err());
        assert!(validate_locale("en-aaaaaaaaaaaaaaaaaaaaaaaa").is_err());
    }

    #[test]
    fn test_path_segment_validation() {
        assert_eq!(validate_path_segment("version", " 1.2.0 ").unwrap(), "1.2.0");
        assert!(validate_path_segment("version", "..").is_err());
        assert!(validate_path_segment("version", "1/2").is_err());
        assert!(validate_path_segment("version", "").is_err());
    }

    #[test]
    fn test_parse_includes() {
        assert_eq!(
            Scope::parse_includes("version,app-info").unwrap(),
            vec![Scope::AppInfo, Scope::Version]
        );
        assert_eq!(Scope::parse_includes("localizations").unwrap().len(), 2);
        assert!(Scope::parse_includes("screenshots").is_err());
    }

    fn write(dir: &std::path::Path, rel: &str, body: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    async fn stub_remote(server: &mut mockito::ServerGuard) {
        server
            .mock("GET", "/v1/apps/app-1/appInfos")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"data":[
                    {"type":"appInfos","id":"info-live","attributes":{"state":"READY_FOR_DISTRIBUTION"}},
                    {"type":"appInfos","id":"info-1","attributes":{"state":"PREPARE_FOR_SUBMISSION"}}
                ]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/v1/appInfos/info-1/appInfoLocalizations")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"data":[
                    {"type":"appInfoLocalizations","id":"ail-en","attributes":{"locale":"en-US","name":"Sync","subtitle":"Old subtitle"}}
                ]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/v1/apps/app-1/appStoreVersions")
            .match_query(Matcher::Any)
            .with_body(r#"{"data":[{"type":"appStoreVersions","id":"ver-1","attributes":{"versionString":"1.2.0","platform":"IOS"}}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/appStoreVersions/ver-1/appStoreVersionLocalizations")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"data":[
                    {"type":"appStoreVersionLocalizations","id":"avl-en","attributes":{"locale":"en-US","description":"Sync files","keywords":"sync,files"}},
                    {"type":"appStoreVersionLocalizations","id":"avl-fr","attributes":{"locale":"fr-FR","description":"Synchroniser"}}
                ]}"#,
            )
            .create_async()
            .await;
    }

    fn local_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app-info/en-US.json", r#"{"name":"Sync","subtitle":"Files everywhere"}"#);
        write(
            dir.path(),
            "version/1.2.0/en-US.json",
            r#"{"description":"Sync files","whatsNew":"Bug fixes"}"#,
        );
        dir
    }

    fn client(server: &mockito::ServerGuard) -> AscClient {
        AscClient::new(Arc::new(StaticToken::new("test-token")))
            .unwrap()
            .with_base_url(&server.url())
            .unwrap()
            .with_retry_policy(crate::api::RetryPolicy::none())
    }

    fn options(dir: &TempDir, dry_run: bool) -> PushOptions {
        PushOptions {
            app_id: "app-1".into(),
            version: "1.2.0".into(),
            platform: None,
            dir: dir.path().to_path_buf(),
            includes: vec![Scope::AppInfo, Scope::Version],
            dry_run,
            allow_deletes: false,
            confirm: false,
        }
    }

    #[tokio::test]
    async fn test_dry_run_plan_is_deterministic() {
        let mut server = mockito::Server::new_async().await;
        stub_remote(&mut server).await;
        let dir = local_tree();
        let client = client(&server);

        let mut outputs = Vec::new();
        for _ in 0..2 {
            let resolver = ResourceResolver::new(client.clone());
            let result = push(&client, &resolver, &options(&dir, true)).await.unwrap();
            outputs.push(serde_json::to_vec(&result).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);

        let result: serde_json::Value = serde_json::from_slice(&outputs[0]).unwrap();
        assert_eq!(result["appInfoId"], "info-1");
        assert_eq!(result["versionId"], "ver-1");
        assert_eq!(result["adds"][0]["key"], "version:1.2.0:en-US:whatsNew");
        assert_eq!(result["updates"][0]["key"], "app-info:en-US:subtitle");
        assert_eq!(result["updates"][0]["reason"], "field value differs");

        let deletes: Vec<&str> = result["deletes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            deletes,
            vec![
                "version:1.2.0:en-US:keywords",
                "version:1.2.0:fr-FR:description"
            ]
        );
        assert!(result.get("actions").is_none());
    }

    #[tokio::test]
    async fn test_apply_guardrails() {
        let mut server = mockito::Server::new_async().await;
        stub_remote(&mut server).await;
        let dir = local_tree();
        let client = client(&server);

        let resolver = ResourceResolver::new(client.clone());
        let err = push(&client, &resolver, &options(&dir, false)).await.unwrap_err();
        assert_eq!(err.to_string(), "--allow-deletes is required to apply delete operations");
        assert_eq!(err.exit_code(), 2);

        let mut opts = options(&dir, false);
        opts.allow_deletes = true;
        let err = push(&client, &resolver, &opts).await.unwrap_err();
        assert_eq!(err.to_string(), "--confirm is required when applying delete operations");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_push_result_table() {
        let result = PushResult {
            app_id: "app-1".into(),
            app_info_id: "info-1".into(),
            version: "1.2.0".into(),
            version_id: "ver-1".into(),
            dir: "./metadata".into(),
            dry_run: true,
            applied: false,
            includes: vec![Scope::Version],
            adds: vec![PlanItem::add(Scope::Version, Some("1.2.0"), "en-US", "whatsNew", "Bug fixes")],
            updates: Vec::new(),
            deletes: Vec::new(),
            api_calls: Vec::new(),
            actions: Vec::new(),
        };
        let out = crate::output::render_markdown(&result);
        assert!(out.starts_with("**App ID:** app-1\n"));
        assert!(out.contains("| change | key | from | to | reason |"));
        assert!(out.contains("| add | version:1.2.0:en-US:whatsNew |  | Bug fixes | field exists locally but not remotely |"));
    }
}
