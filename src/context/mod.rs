//
//  asc-cli
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Invocation Context
//!
//! Everything one command invocation shares: the resolved global flags
//! ([`Settings`]), the config file, the deadline, the lazily built API client
//! and the [`ResourceResolver`] with its per-invocation cache.
//!
//! ## Example
//!
//! ```rust,no_run
//! use asc_cli::config::Config;
//! use asc_cli::context::{InvocationContext, Settings};
//!
//! # async fn demo() -> Result<(), asc_cli::AscError> {
//! let ctx = InvocationContext::new(Settings::default(), Config::default());
//! let app_id = ctx.resolver()?.resolve_app("com.example.sync").await?;
//! println!("{app_id}");
//! # Ok(())
//! # }
//! ```

mod deadline;
mod resolver;

pub use deadline::*;
pub use resolver::*;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use url::Url;

use crate::api::{AscClient, KNOWN_HOSTS};
use crate::auth::{resolve_credentials, TokenManager};
use crate::config::Config;
use crate::error::AscError;
use crate::output::{OutputFormat, OutputWriter};

/// Largest page size App Store Connect accepts.
pub const MAX_LIMIT: u32 = 200;

pub const ENV_APP_ID: &str = "ASC_APP_ID";
pub const ENV_VENDOR_NUMBER: &str = "ASC_VENDOR_NUMBER";
pub const ENV_ANALYTICS_VENDOR_NUMBER: &str = "ASC_ANALYTICS_VENDOR_NUMBER";

/// App Store platforms as the API spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Ios,
    MacOs,
    TvOs,
    VisionOs,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Self::Ios, Self::MacOs, Self::TvOs, Self::VisionOs];

    /// Parses `IOS`, `ios`, `MAC_OS`, `macos`, and so on.
    pub fn parse(value: &str) -> Result<Self, AscError> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "IOS" => Ok(Self::Ios),
            "MACOS" => Ok(Self::MacOs),
            "TVOS" => Ok(Self::TvOs),
            "VISIONOS" => Ok(Self::VisionOs),
            _ => Err(AscError::validation(format!(
                "invalid platform {value:?} (expected IOS, MAC_OS, TV_OS or VISION_OS)"
            ))),
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Ios => "IOS",
            Self::MacOs => "MAC_OS",
            Self::TvOs => "TV_OS",
            Self::VisionOs => "VISION_OS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Global flags after environment and config defaults were applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputFormat,
    pub pretty: bool,
    pub paginate: bool,
    pub stream: bool,
    pub next: Option<String>,
    pub limit: Option<u32>,
    pub timeout: Duration,
    pub page_timeout: Option<Duration>,
    pub api_debug: bool,
    pub strict_auth: bool,
    /// Overrides the API origin. Hidden; used by tests.
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: OutputFormat::Json,
            pretty: false,
            paginate: false,
            stream: false,
            next: None,
            limit: None,
            timeout: DEFAULT_TIMEOUT,
            page_timeout: None,
            api_debug: false,
            strict_auth: false,
            base_url: None,
        }
    }
}

impl Settings {
    /// Checks flag combinations that are invalid for every command.
    ///
    /// Runs before credentials are needed, so shape errors never wait on
    /// authentication.
    pub fn validate(&self) -> Result<(), AscError> {
        if self.stream && !self.paginate {
            return Err(AscError::usage("--stream requires --paginate"));
        }
        if let Some(limit) = self.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(AscError::usage(format!("--limit must be between 1 and {MAX_LIMIT}")));
            }
        }
        if self.pretty && self.output != OutputFormat::Json {
            return Err(AscError::usage("--pretty is only valid with JSON output"));
        }
        if let Some(next) = &self.next {
            validate_next_flag(next, self.base_url.as_deref())?;
        }
        Ok(())
    }
}

/// Checks a `--next` URL: `https` on an App Store Connect host, or on the
/// overridden base URL's origin.
pub fn validate_next_flag(next: &str, base_url: Option<&str>) -> Result<Url, AscError> {
    let invalid = || AscError::usage("--next must be an App Store Connect URL");
    let url = Url::parse(next.trim()).map_err(|_| invalid())?;

    if let Some(base) = base_url.and_then(|b| Url::parse(b).ok()) {
        if url.scheme() == base.scheme()
            && url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default()
        {
            return Ok(url);
        }
    }

    let known = url.scheme() == "https"
        && url
            .host_str()
            .is_some_and(|host| KNOWN_HOSTS.iter().any(|k| k.eq_ignore_ascii_case(host)));
    if known {
        Ok(url)
    } else {
        Err(invalid())
    }
}

/// Picks the first non-blank value.
pub fn first_present<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Shared state of one command invocation.
pub struct InvocationContext {
    pub settings: Settings,
    pub config: Config,
    deadline: Deadline,
    client: OnceCell<AscClient>,
    resolver: OnceCell<ResourceResolver>,
}

impl InvocationContext {
    /// Starts the invocation clock.
    pub fn new(settings: Settings, config: Config) -> Self {
        let deadline = Deadline::after(settings.timeout);
        Self {
            settings,
            config,
            deadline,
            client: OnceCell::new(),
            resolver: OnceCell::new(),
        }
    }

    /// A context around an existing client. Used by tests.
    pub fn with_client(settings: Settings, config: Config, client: AscClient) -> Self {
        let ctx = Self::new(settings, config);
        let client = client.with_deadline(ctx.deadline);
        // A fresh cell cannot already hold a value.
        let _ = ctx.client.set(client);
        ctx
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// The API client, built on first use.
    ///
    /// # Errors
    ///
    /// Credential resolution and key loading failures.
    pub fn client(&self) -> Result<&AscClient, AscError> {
        self.client.get_or_try_init(|| self.build_client())
    }

    fn build_client(&self) -> Result<AscClient, AscError> {
        let credentials = resolve_credentials(
            |name| std::env::var(name).ok(),
            &self.config.auth,
            self.settings.strict_auth,
        )?;
        tracing::debug!(
            key_id = %credentials.key_id,
            key_source = %credentials.sources.private_key,
            "resolved API credentials"
        );
        let tokens = TokenManager::new(&credentials)?;

        let mut client = AscClient::new(Arc::new(tokens))?
            .with_retry_policy(self.config.retry_policy()?)
            .with_api_debug(self.settings.api_debug)
            .with_deadline(self.deadline);
        if let Some(base_url) = &self.settings.base_url {
            client = client.with_base_url(base_url)?;
        }
        Ok(client)
    }

    /// The resolver, sharing the client and keeping its cache for the whole
    /// invocation.
    pub fn resolver(&self) -> Result<&ResourceResolver, AscError> {
        self.resolver
            .get_or_try_init(|| Ok(ResourceResolver::new(self.client()?.clone())))
    }

    pub fn output(&self) -> Result<OutputWriter, AscError> {
        OutputWriter::new(self.settings.output, self.settings.pretty)
    }

    /// `--app` value, else `ASC_APP_ID`, else the config default.
    pub fn app_default(&self, flag: Option<&str>) -> Option<String> {
        first_present([
            flag.map(String::from),
            crate::util::env_var(ENV_APP_ID),
            self.config.defaults.app_id.clone(),
        ])
    }

    /// `--vendor` value, else the vendor number from the environment or config.
    pub fn vendor_default(&self, flag: Option<&str>) -> Option<String> {
        first_present([
            flag.map(String::from),
            crate::util::env_var(ENV_VENDOR_NUMBER),
            crate::util::env_var(ENV_ANALYTICS_VENDOR_NUMBER),
            self.config.defaults.vendor_number.clone(),
            self.config.defaults.analytics_vendor_number.clone(),
        ])
    }

    /// Page size for list requests: `--limit`, else the maximum when
    /// paginating.
    pub fn effective_limit(&self) -> Option<u32> {
        self.settings
            .limit
            .or(self.settings.paginate.then_some(MAX_LIMIT))
    }
}
