//
//  asc-cli
//  cli/bindings/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Data-driven endpoint commands.
//!
//! Each [`Binding`] describes one endpoint: where its flags go (path, query,
//! body attributes or relationships), how the response is shaped, and which
//! columns a table shows. [`augment`] turns the catalog into clap
//! subcommands and [`execute`] runs any of them through the same transport,
//! paginator and renderer.

mod catalog;

pub use catalog::CATALOG;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::api::{decode_gzip_tsv, fill_path_template, Document, Paginator, RequestDescriptor, Resource};
use crate::context::{validate_next_flag, InvocationContext, Platform};
use crate::error::AscError;
use crate::output::{spinner, write_json_line, Column, OutputFormat, OutputWriter, ProjectedDocument, TableOutput};
use crate::util::split_csv;

use super::help::EXPERIMENTAL_BANNER;

/// How a flag value is interpreted before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Text,
    /// An app ID, bundle ID or exact name. Defaults from `ASC_APP_ID`.
    App,
    /// A vendor number. Defaults from `ASC_VENDOR_NUMBER`.
    Vendor,
    Platform,
    /// Comma-separated values, normalized.
    Csv,
    Number,
    Switch,
}

/// Where a flag value ends up in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Fills the `{name}` placeholder of the path template.
    Path,
    Query(&'static str),
    Attribute(&'static str),
    /// A to-one relationship `(name, resource type)`.
    Relationship(&'static str, &'static str),
    /// Consumed by the command itself.
    Local,
}

#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: FlagKind,
    pub target: Target,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl FlagSpec {
    pub const fn new(name: &'static str, help: &'static str, target: Target) -> Self {
        Self {
            name,
            help,
            kind: FlagKind::Text,
            target,
            required: false,
            default: None,
        }
    }

    pub const fn path(name: &'static str, help: &'static str) -> Self {
        Self::new(name, help, Target::Path).required()
    }

    pub const fn query(name: &'static str, param: &'static str, help: &'static str) -> Self {
        Self::new(name, help, Target::Query(param))
    }

    pub const fn kind(mut self, kind: FlagKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// How the response body is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A JSON:API document.
    Document,
    /// A gzip TSV report.
    Report,
    /// A screenshot resource whose image is downloaded to `--output-dir`.
    Asset,
}

/// One endpoint exposed as a command.
#[derive(Debug)]
pub struct Binding {
    /// Command groups leading to the leaf, e.g. `["subscriptions", "price-points"]`.
    pub group: &'static [&'static str],
    pub leaf: &'static str,
    pub about: &'static str,
    pub method: Method,
    pub path: &'static str,
    /// Resource type of the request body, for `POST`/`PATCH`.
    pub resource_type: Option<&'static str>,
    pub flags: &'static [FlagSpec],
    /// Accepts `--limit`, `--paginate`, `--stream` and `--next`.
    pub list: bool,
    pub columns: &'static [Column],
    pub response: ResponseKind,
    pub experimental: bool,
}

impl Binding {
    /// `apps list`, `subscriptions price-points list`.
    pub fn command_path(&self) -> String {
        let mut parts = self.group.to_vec();
        parts.push(self.leaf);
        parts.join(" ")
    }
}

const LIST_HELP: &str = "Pagination: --limit <1-200> sets the page size, --paginate fetches every page, \
                         --stream (with --paginate) writes each page as it arrives, --next <URL> resumes from a \
                         links.next URL.";

fn group_about(name: &str) -> &'static str {
    match name {
        "apps" => "Manage apps",
        "builds" => "Manage builds",
        "versions" => "Manage App Store versions",
        "app-infos" => "Manage app infos",
        "beta-groups" => "Manage TestFlight beta groups",
        "beta-testers" => "Manage TestFlight beta testers",
        "reviews" => "Read customer reviews",
        "bundle-ids" => "Manage bundle identifiers",
        "subscriptions" => "Manage auto-renewable subscriptions",
        "price-points" => "Subscription price points",
        "iap" => "Manage in-app purchases",
        "users" => "Manage team users",
        "certificates" => "Manage signing certificates",
        "screenshots" => "Manage App Store screenshots",
        "analytics" => "Download sales and analytics reports",
        "nominations" => "Manage featuring nominations",
        _ => "",
    }
}

/// Adds every catalog binding to `root`, creating groups as needed.
pub fn augment(mut root: Command) -> Command {
    for binding in CATALOG {
        root = insert(root, binding.group, leaf_command(binding), binding.experimental);
    }
    root
}

fn insert(parent: Command, path: &[&'static str], leaf: Command, experimental: bool) -> Command {
    let Some((name, rest)) = path.split_first() else {
        return parent.subcommand(leaf);
    };
    let name = *name;
    if parent.find_subcommand(name).is_some() {
        return parent.mut_subcommand(name, |group| insert(group, rest, leaf, experimental));
    }

    let mut group = Command::new(name)
        .about(group_about(name))
        .subcommand_required(true)
        .arg_required_else_help(true);
    if experimental {
        group = group.before_help(EXPERIMENTAL_BANNER);
    }
    parent.subcommand(insert(group, rest, leaf, experimental))
}

fn leaf_command(binding: &Binding) -> Command {
    let mut cmd = Command::new(binding.leaf).about(binding.about);
    if binding.list {
        cmd = cmd.after_help(LIST_HELP);
    }
    if binding.experimental {
        cmd = cmd.before_help(EXPERIMENTAL_BANNER);
    }
    for flag in binding.flags {
        let mut arg = Arg::new(flag.name).long(flag.name).help(flag.help);
        arg = match flag.kind {
            FlagKind::Switch => arg.action(ArgAction::SetTrue),
            _ => arg.value_name(flag.name.to_uppercase().replace('-', "_")).action(ArgAction::Set),
        };
        if let Some(default) = flag.default {
            arg = arg.help(format!("{} [default: {default}]", flag.help));
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

/// Finds the binding selected in `matches`, with the leaf's matches.
pub fn locate(matches: &ArgMatches) -> Option<(&'static Binding, &ArgMatches)> {
    let mut names = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        names.push(name);
        current = sub;
    }
    let (leaf, group) = names.split_last()?;
    CATALOG
        .iter()
        .find(|b| b.leaf == *leaf && b.group == group)
        .map(|b| (b, current))
}

/// True when `name` is a top-level group created from the catalog.
pub fn is_binding_group(name: &str) -> bool {
    CATALOG.iter().any(|b| b.group.first() == Some(&name))
}

/// Flag values as the user typed them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlagValues(BTreeMap<&'static str, String>);

impl FlagValues {
    pub fn from_matches(binding: &Binding, matches: &ArgMatches) -> Self {
        let mut values = BTreeMap::new();
        for flag in binding.flags {
            let value = match flag.kind {
                FlagKind::Switch => matches.get_flag(flag.name).then(|| "true".to_string()),
                _ => matches.get_one::<String>(flag.name).cloned(),
            };
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                values.insert(flag.name, value);
            }
        }
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }
}

/// Runs a binding end to end: build the request, send it, render it.
pub async fn execute(ctx: &InvocationContext, binding: &Binding, values: &FlagValues) -> Result<(), AscError> {
    let settings = &ctx.settings;
    if !binding.list && (settings.paginate || settings.next.is_some()) {
        return Err(AscError::usage(format!(
            "--paginate and --next are only valid for list commands, not {}",
            binding.command_path()
        )));
    }
    let writer = ctx.output()?;

    let req = match &settings.next {
        Some(next) => RequestDescriptor::get(validate_next_flag(next, settings.base_url.as_deref())?.to_string()),
        None => build_request(ctx, binding, values).await?,
    };
    debug!(command = %binding.command_path(), path = %req.path, "executing binding");

    match binding.response {
        ResponseKind::Document => render_document(ctx, &req, binding.columns, &writer).await,
        ResponseKind::Report => {
            let raw = ctx
                .client()?
                .execute(&req.accept("application/a-gzip"))
                .await?
                .error_for_status()?;
            writer.write(&decode_gzip_tsv(&raw.body)?)
        }
        ResponseKind::Asset => {
            let dir = values.get("output-dir").unwrap_or(".");
            let result = download_screenshot(ctx, &req, Path::new(dir)).await?;
            writer.write(&result)
        }
    }
}

/// Resolves flag defaults and identifiers and assembles the request.
///
/// # Errors
///
/// [`AscError::Usage`] for missing required flags, validation errors for
/// malformed values, and resolver errors for app identifiers.
pub async fn build_request(
    ctx: &InvocationContext,
    binding: &Binding,
    values: &FlagValues,
) -> Result<RequestDescriptor, AscError> {
    let mut params = BTreeMap::new();
    let mut query = Vec::new();
    let mut attributes = Map::new();
    let mut relationships = Map::new();

    for flag in binding.flags {
        let given = values.get(flag.name);
        let raw = match flag.kind {
            FlagKind::App => ctx.app_default(given),
            FlagKind::Vendor => ctx.vendor_default(given),
            _ => given.or(flag.default).map(String::from),
        };
        let Some(raw) = raw else {
            if flag.required {
                return Err(AscError::usage(format!("--{} is required", flag.name)));
            }
            continue;
        };

        let value = match flag.kind {
            FlagKind::App => ctx.resolver()?.resolve_app(&raw).await?,
            FlagKind::Platform => Platform::parse(&raw)?.as_api_str().to_string(),
            FlagKind::Csv => {
                let items = split_csv(&raw);
                if items.is_empty() {
                    return Err(AscError::usage(format!("--{} must not be empty", flag.name)));
                }
                items.join(",")
            }
            FlagKind::Number => {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| AscError::validation(format!("--{} must be a number", flag.name)))?;
                raw.trim().to_string()
            }
            FlagKind::Text | FlagKind::Vendor | FlagKind::Switch => raw,
        };

        match flag.target {
            Target::Path => {
                params.insert(flag.name.to_string(), value);
            }
            Target::Query(param) => query.push((param, value)),
            Target::Attribute(name) => {
                let value = match flag.kind {
                    FlagKind::Switch => Value::Bool(true),
                    FlagKind::Number => value.parse::<u64>().map(Value::from).unwrap_or(Value::String(value)),
                    _ => Value::String(value),
                };
                attributes.insert(name.to_string(), value);
            }
            Target::Relationship(name, kind) => {
                relationships.insert(name.to_string(), json!({ "data": { "type": kind, "id": value } }));
            }
            Target::Local => {}
        }
    }

    let path = fill_path_template(binding.path, &params)?;
    let mut req = RequestDescriptor::new(binding.method.clone(), path);
    for (param, value) in query {
        req = req.query(param, value);
    }
    if binding.list {
        if let Some(limit) = ctx.effective_limit() {
            req = req.set_query("limit", limit.to_string());
        }
    }
    if let Some(kind) = binding.resource_type {
        let mut data = json!({ "type": kind, "attributes": attributes });
        if !relationships.is_empty() {
            data["relationships"] = Value::Object(relationships);
        }
        req = req.body(json!({ "data": data }));
    }
    Ok(req)
}

/// Sends a GET and renders the result, honoring the global pagination flags.
pub async fn render_document(
    ctx: &InvocationContext,
    req: &RequestDescriptor,
    columns: &[Column],
    writer: &OutputWriter,
) -> Result<(), AscError> {
    let client = ctx.client()?;
    let columns = columns.to_vec();
    let paginator = Paginator::new(client).with_page_timeout(ctx.settings.page_timeout);

    if ctx.settings.paginate && ctx.settings.stream {
        let stdout = io::stdout();
        let pages = paginator
            .paginate_stream(req, |page| {
                let mut out = stdout.lock();
                write_page(&mut out, writer, page, &columns)
            })
            .await?;
        debug!(pages, "streamed pages");
        return Ok(());
    }

    let document = if ctx.settings.paginate {
        paginator
            .with_progress(spinner("Fetching pages..."))
            .paginate_all(req)
            .await?
    } else {
        client
            .send_with_timeout(req, ctx.settings.page_timeout)
            .await?
    };
    writer.write(&ProjectedDocument { document, columns })
}

/// Writes one streamed page. JSON writes the page document as one line,
/// NDJSON one line per resource, tables and markdown one block per page.
pub fn write_page<W: Write>(
    out: &mut W,
    writer: &OutputWriter,
    page: &Document,
    columns: &[Column],
) -> Result<(), AscError> {
    match writer.format() {
        OutputFormat::Json => write_json_line(out, page),
        OutputFormat::Ndjson => {
            for resource in page.resources() {
                write_json_line(out, resource)?;
            }
            Ok(())
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            let projected = ProjectedDocument {
                document: page.clone(),
                columns: columns.to_vec(),
            };
            writer.write_to(out, &projected)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// Result of `screenshots download`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

impl TableOutput for DownloadResult {
    fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("ID".to_string(), self.id.clone()),
            ("Path".to_string(), self.path.display().to_string()),
            ("Bytes".to_string(), self.bytes.to_string()),
        ]
    }

    fn headers(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        Vec::new()
    }
}

/// Fetches a screenshot resource and saves its image under `dir`.
pub async fn download_screenshot(
    ctx: &InvocationContext,
    req: &RequestDescriptor,
    dir: &Path,
) -> Result<DownloadResult, AscError> {
    let client = ctx.client()?;
    let doc = client.send(req).await?;
    let shot = doc
        .single()
        .ok_or_else(|| AscError::NotFound(format!("no screenshot at {}", req.path)))?;
    let url = asset_url(shot)?;
    let bytes = client.download_asset(&url).await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(asset_file_name(shot));
    tokio::fs::write(&path, &bytes).await?;
    debug!(id = %shot.id, path = %path.display(), "saved screenshot");

    Ok(DownloadResult {
        id: shot.id.clone(),
        path,
        bytes: bytes.len(),
    })
}

/// Substitutes `{w}`, `{h}` and `{f}` in `imageAsset.templateUrl`.
pub fn asset_url(resource: &Resource) -> Result<String, AscError> {
    let template = resource
        .lookup("imageAsset.templateUrl")
        .and_then(|v| v.as_str().map(String::from))
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AscError::validation(format!("screenshot {} has no image asset yet", resource.id)))?;
    let dimension = |name: &str| {
        resource
            .lookup(&format!("imageAsset.{name}"))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| AscError::validation(format!("screenshot {} has no image {name}", resource.id)))
    };
    let (width, height) = (dimension("width")?, dimension("height")?);

    Ok(template
        .replace("{w}", &width.to_string())
        .replace("{h}", &height.to_string())
        .replace("{f}", asset_extension(resource)))
}

fn asset_extension(resource: &Resource) -> &str {
    resource
        .attr_str("fileName")
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or("png")
}

/// The uploaded file name without directories, else `<id>.png`.
fn asset_file_name(resource: &Resource) -> String {
    resource
        .attr_str("fileName")
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.starts_with('.'))
        .map(String::from)
        .unwrap_or_else(|| format!("{}.{}", resource.id, asset_extension(resource)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AscClient;
    use crate::auth::StaticToken;
    use crate::config::Config;
    use crate::context::Settings;
    use mockito::Matcher;
    use std::sync::Arc;

    fn binding(group: &[&str], leaf: &str) -> &'static Binding {
        CATALOG
            .iter()
            .find(|b| b.group == group && b.leaf == leaf)
            .unwrap()
    }

    fn context(server: &mockito::ServerGuard, settings: Settings) -> InvocationContext {
        let client = AscClient::new(Arc::new(StaticToken::new("test-token")))
            .unwrap()
            .with_base_url(&server.url())
            .unwrap()
            .with_retry_policy(crate::api::RetryPolicy::none());
        InvocationContext::with_client(settings, Config::default(), client)
    }

    #[test]
    fn test_catalog_is_unique_and_parses() {
        let mut paths: Vec<String> = CATALOG.iter().map(Binding::command_path).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);

        let cmd = augment(Command::new("asc"));
        cmd.clone().debug_assert();
        let matches = cmd
            .try_get_matches_from(["asc", "subscriptions", "price-points", "list", "--subscription-id", "sub-1"])
            .unwrap();
        let (found, leaf) = locate(&matches).unwrap();
        assert_eq!(found.command_path(), "subscriptions price-points list");
        let values = FlagValues::from_matches(found, leaf);
        assert_eq!(values.get("subscription-id"), Some("sub-1"));
        assert!(is_binding_group("subscriptions"));
        assert!(!is_binding_group("metadata"));
    }

    #[test]
    fn test_every_list_binding_documents_limit() {
        let cmd = augment(Command::new("asc"));
        for b in CATALOG.iter().filter(|b| b.list) {
            let mut current = &cmd;
            for name in b.group.iter().chain([&b.leaf]) {
                current = current.find_subcommand(name).unwrap();
            }
            let help = current.get_after_help().map(|h| h.to_string()).unwrap_or_default();
            assert!(help.contains("1-200"), "{}", b.command_path());
        }
    }

    #[test]
    fn test_asset_url_substitution() {
        let shot = Resource::new("appScreenshots", "shot-1")
            .with_attribute("fileName", "home.jpg")
            .with_attribute(
                "imageAsset",
                json!({"templateUrl": "https://cdn.example.com/a/{w}x{h}bb.{f}", "width": 1242, "height": 2688}),
            );
        assert_eq!(asset_url(&shot).unwrap(), "https://cdn.example.com/a/1242x2688bb.jpg");
        assert_eq!(asset_file_name(&shot), "home.jpg");

        let pending = Resource::new("appScreenshots", "shot-2");
        assert!(matches!(asset_url(&pending), Err(AscError::Validation(_))));
        assert_eq!(asset_file_name(&pending), "shot-2.png");

        let sneaky = Resource::new("appScreenshots", "shot-3").with_attribute("fileName", "../../etc/passwd");
        assert_eq!(asset_file_name(&sneaky), "passwd");
    }

    #[tokio::test]
    async fn test_missing_required_flag() {
        let server = mockito::Server::new_async().await;
        let ctx = context(&server, Settings::default());
        let err = build_request(&ctx, binding(&["builds"], "get"), &FlagValues::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "--build-id is required");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_resolved_app_lands_in_path() {
        let mut server = mockito::Server::new_async().await;
        let lookup = server
            .mock("GET", "/v1/apps")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter[bundleId]".into(), "com.example.sync".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
            ]))
            .with_body(r#"{"data":[{"type":"apps","id":"app-sync"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let settings = Settings {
            limit: Some(50),
            ..Default::default()
        };
        let ctx = context(&server, settings);
        let mut values = FlagValues::default();
        values.set("app", "com.example.sync");
        values.set("platform", "ios");

        let req = build_request(&ctx, binding(&["versions"], "list"), &values).await.unwrap();
        assert_eq!(req.path, "/v1/apps/app-sync/appStoreVersions");
        assert_eq!(req.query_value("filter[platform]"), Some("IOS"));
        assert_eq!(req.query_value("limit"), Some("50"));
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_body() {
        let server = mockito::Server::new_async().await;
        let ctx = context(&server, Settings::default());
        let mut values = FlagValues::default();
        values.set("app", "123456789");
        values.set("name", "Friends");
        values.set("public-link-enabled", "true");

        let req = build_request(&ctx, binding(&["beta-groups"], "create"), &values).await.unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(
            req.body.unwrap(),
            json!({"data": {
                "type": "betaGroups",
                "attributes": {"name": "Friends", "publicLinkEnabled": true},
                "relationships": {"app": {"data": {"type": "apps", "id": "123456789"}}}
            }})
        );
    }

    #[tokio::test]
    async fn test_paginate_rejected_for_single_resource() {
        let server = mockito::Server::new_async().await;
        let settings = Settings {
            paginate: true,
            ..Default::default()
        };
        let ctx = context(&server, settings);
        let mut values = FlagValues::default();
        values.set("build-id", "b-1");
        let err = execute(&ctx, binding(&["builds"], "get"), &values).await.unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_stream_writes_one_line_per_page_or_resource() {
        let page = Document::collection(vec![Resource::new("apps", "1"), Resource::new("apps", "2")]);

        let mut out = Vec::new();
        write_page(&mut out, &OutputWriter::json(), &page, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);

        let ndjson = OutputWriter::new(OutputFormat::Ndjson, false).unwrap();
        let mut out = Vec::new();
        write_page(&mut out, &ndjson, &page, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"type\":\"apps\",\"id\":\"1\"}\n{\"type\":\"apps\",\"id\":\"2\"}\n"
        );
    }
}
