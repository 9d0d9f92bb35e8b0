//
//  asc-cli
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Direct API access command
//!
//! Sends an arbitrary request through the same transport, paginator and
//! renderer as every other command. Useful for endpoints without a
//! dedicated command.
//!
//! ## Examples
//!
//! ```bash
//! # Get an app
//! asc api /v1/apps/123456789
//!
//! # Filters on GET become query parameters
//! asc api /v1/builds -F 'filter[app]=123456789' -F limit=5
//!
//! # Rename a beta group
//! asc api -X PATCH /v1/betaGroups/abc \
//!     -F data.type=betaGroups -F data.id=abc -F data.attributes.name="QA"
//!
//! # Follow every page
//! asc api /v1/apps --paginate
//! ```

use std::fs;
use std::io::Read;

use clap::Args;
use reqwest::Method;
use serde_json::{Map, Value};

use crate::api::RequestDescriptor;
use crate::context::{validate_next_flag, InvocationContext};
use crate::error::AscError;

use super::bindings::render_document;

/// Make direct API requests
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// API path (e.g., /v1/apps) or full App Store Connect URL
    pub endpoint: String,

    /// HTTP method (GET, POST, PATCH, DELETE)
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Request headers as 'Name: Value' (can be specified multiple times)
    #[arg(long, short = 'H', action = clap::ArgAction::Append)]
    pub header: Vec<String>,

    /// Typed fields as key=value; query parameters on GET, JSON body otherwise.
    /// Dotted keys nest.
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,

    /// Raw field values (strings only)
    #[arg(long, action = clap::ArgAction::Append)]
    pub raw_field: Vec<String>,

    /// Read the JSON request body from a file (- for stdin)
    #[arg(long, short = 'f')]
    pub input: Option<String>,
}

impl ApiCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        let method = self.parse_method()?;
        if method != Method::GET && (ctx.settings.paginate || ctx.settings.next.is_some()) {
            return Err(AscError::usage("--paginate and --next are only valid with GET"));
        }
        let req = self.build_request(ctx, method)?;
        let writer = ctx.output()?;

        if req.method == Method::GET {
            return render_document(ctx, &req, &[], &writer).await;
        }

        let document = ctx.client()?.send(&req).await?;
        writer.write(&document)
    }

    fn build_request(&self, ctx: &InvocationContext, method: Method) -> Result<RequestDescriptor, AscError> {
        if let Some(next) = &ctx.settings.next {
            let url = validate_next_flag(next, ctx.settings.base_url.as_deref())?;
            return Ok(RequestDescriptor::get(url.to_string()));
        }

        let (path, query) = self.split_endpoint(ctx)?;
        let mut req = RequestDescriptor::new(method.clone(), path);
        for (key, value) in query {
            req = req.query(key, value);
        }
        for (name, value) in self.parse_headers()? {
            req = req.header(name, value);
        }

        let fields = self.parse_fields()?;
        if method == Method::GET || method == Method::DELETE {
            if self.input.is_some() {
                return Err(AscError::usage(format!("--input is not valid with {method}")));
            }
            for (key, value) in fields {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                req = req.query(key, value);
            }
            return Ok(req);
        }

        if let Some(body) = self.read_input()? {
            if !fields.is_empty() {
                return Err(AscError::usage("--input cannot be combined with -F/--raw-field"));
            }
            return Ok(req.body(body));
        }
        if !fields.is_empty() {
            let mut body = Map::new();
            for (key, value) in fields {
                set_nested_value(&mut body, &key, value);
            }
            req = req.body(Value::Object(body));
        }
        Ok(req)
    }

    fn parse_method(&self) -> Result<Method, AscError> {
        match self.method.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(AscError::usage(format!("unsupported HTTP method: {}", self.method))),
        }
    }

    /// Path plus any query string written inline in the endpoint.
    fn split_endpoint(&self, ctx: &InvocationContext) -> Result<(String, Vec<(String, String)>), AscError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(AscError::usage("an API path is required"));
        }
        if endpoint.contains("://") {
            // Absolute URLs must stay on App Store Connect; the token goes with them.
            validate_next_flag(endpoint, ctx.settings.base_url.as_deref())
                .map_err(|_| AscError::usage("endpoint must be an App Store Connect URL or a path"))?;
        }

        let (path, query) = endpoint.split_once('?').unwrap_or((endpoint, ""));
        let path = if path.starts_with('/') || path.contains("://") {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let query = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok((path, query))
    }

    fn parse_headers(&self) -> Result<Vec<(String, String)>, AscError> {
        self.header
            .iter()
            .map(|header| {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| AscError::usage(format!("invalid header {header:?}; expected 'Name: Value'")))?;
                let name = name.trim();
                if name.eq_ignore_ascii_case("authorization") {
                    return Err(AscError::usage("the Authorization header is set automatically"));
                }
                Ok((name.to_string(), value.trim().to_string()))
            })
            .collect()
    }

    fn parse_fields(&self) -> Result<Vec<(String, Value)>, AscError> {
        let mut fields = Vec::new();
        for field in &self.field {
            let (key, value) = split_field(field)?;
            fields.push((key.to_string(), typed_value(value)));
        }
        for field in &self.raw_field {
            let (key, value) = split_field(field)?;
            fields.push((key.to_string(), Value::String(value.to_string())));
        }
        Ok(fields)
    }

    fn read_input(&self) -> Result<Option<Value>, AscError> {
        let Some(input) = &self.input else {
            return Ok(None);
        };
        let content = if input == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            fs::read_to_string(input)?
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AscError::validation(format!("--input is not valid JSON: {e}")))
    }
}

fn split_field(field: &str) -> Result<(&str, &str), AscError> {
    field
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim(), value))
        .ok_or_else(|| AscError::usage(format!("invalid field {field:?}; expected key=value")))
}

/// Reads `true`, `false`, `null`, numbers and JSON literals as typed values.
fn typed_value(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = value.parse::<i64>() {
                return Value::Number(n.into());
            }
            if let Some(n) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
            if value.starts_with('[') || value.starts_with('{') {
                if let Ok(parsed) = serde_json::from_str(value) {
                    return parsed;
                }
            }
            Value::String(value.to_string())
        }
    }
}

fn set_nested_value(obj: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            obj.insert(key.to_string(), value);
        }
        Some((first, rest)) => {
            let entry = obj
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                set_nested_value(nested, rest, value);
            }
        }
    }
}
