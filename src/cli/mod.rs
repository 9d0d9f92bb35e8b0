//
//  asc-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros
//!
//! Hand-written commands live in the [`Commands`] enum. Resource commands
//! such as `apps list` come from the binding catalog and are grafted onto
//! the same tree by [`command`].

mod api;
mod auth;
mod completion;
mod config;
mod diff;
mod metadata;
mod validate;

pub mod bindings;
pub mod help;
pub mod suggest;

pub use api::ApiCommand;
pub use auth::AuthCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use diff::DiffCommand;
pub use metadata::MetadataCommand;
pub use validate::ValidateCommand;

use clap::{ArgMatches, Command, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::config::Config;
use crate::context::{InvocationContext, Settings, DEFAULT_TIMEOUT};
use crate::error::AscError;
use crate::output::{print_warning, OutputFormat};
use crate::util::{env_var, parse_duration};

/// Environment variable holding the default output format.
pub const ENV_DEFAULT_OUTPUT: &str = "ASC_DEFAULT_OUTPUT";

/// Environment variable selecting the log level (`ASC_DEBUG=api` traces HTTP).
pub const ENV_DEBUG: &str = "ASC_DEBUG";

/// App Store Connect CLI - Work with App Store Connect from the command line
#[derive(Parser, Debug)]
#[command(
    name = "asc",
    version,
    about = "Work with App Store Connect from the command line",
    long_about = "asc is a CLI for the App Store Connect API.\n\n\
                  It brings apps, builds, TestFlight, metadata and validation to your terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format: json, ndjson, table or markdown [env: ASC_DEFAULT_OUTPUT]
    #[arg(long, short = 'o', global = true, value_name = "FORMAT")]
    pub output: Option<String>,

    /// Indent JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Follow `links.next` and aggregate every page
    #[arg(long, global = true)]
    pub paginate: bool,

    /// Write each page as it arrives (requires --paginate)
    #[arg(long, global = true)]
    pub stream: bool,

    /// Fetch a single page from a `links.next` URL
    #[arg(long, global = true, value_name = "URL")]
    pub next: Option<String>,

    /// Page size for list requests (1-200)
    #[arg(long, global = true, value_name = "N")]
    pub limit: Option<u32>,

    /// Deadline for the whole command, e.g. 90s or 2m
    #[arg(long, global = true, env = "ASC_TIMEOUT", value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Deadline for each page while paginating
    #[arg(long, global = true, value_name = "DURATION")]
    pub page_timeout: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Trace HTTP requests and responses (secrets redacted)
    #[arg(long, global = true)]
    pub api_debug: bool,

    /// Reject credentials assembled from mixed sources
    #[arg(long, global = true, env = "ASC_STRICT_AUTH")]
    pub strict_auth: bool,

    /// Override the API origin
    #[arg(long, global = true, env = "ASC_BASE_URL", hide = true)]
    pub base_url: Option<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile localized metadata with local files
    Metadata(MetadataCommand),

    /// Compare localizations without changing anything
    Diff(DiffCommand),

    /// Check a version or build for submission readiness
    Validate(ValidateCommand),

    /// Make API requests
    Api(ApiCommand),

    /// Inspect API key credentials
    Auth(AuthCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),
}

impl Commands {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        match self {
            Commands::Metadata(cmd) => cmd.run(ctx).await,
            Commands::Diff(cmd) => cmd.run(ctx).await,
            Commands::Validate(cmd) => cmd.run(ctx).await,
            Commands::Api(cmd) => cmd.run(ctx).await,
            Commands::Auth(cmd) => cmd.run(ctx).await,
            Commands::Config(cmd) => cmd.run(ctx).await,
            Commands::Completion(cmd) => cmd.run(ctx).await,
        }
    }
}

/// The full command tree: derived commands, catalog bindings, grouped help.
pub fn command() -> Command {
    help::with_grouped_help(bindings::augment(Cli::command()))
}

/// Names of every top-level command, for suggestions.
pub fn command_names(cmd: &Command) -> Vec<String> {
    cmd.get_subcommands()
        .filter(|c| !c.is_hide_set())
        .map(|c| c.get_name().to_string())
        .collect()
}

/// Applies environment and config defaults to the parsed global flags.
pub fn settings(global: &GlobalOptions, config: &Config) -> Result<Settings, AscError> {
    let output = match &global.output {
        Some(flag) => OutputFormat::parse(flag)?,
        None => default_output(config),
    };

    let timeout = match global.timeout.as_deref().or(config.defaults.timeout.as_deref()) {
        Some(value) => parse_duration(value)?,
        None => DEFAULT_TIMEOUT,
    };
    let page_timeout = global.page_timeout.as_deref().map(parse_duration).transpose()?;

    let api_debug = global.api_debug
        || env_var(ENV_DEBUG).is_some_and(|v| v.eq_ignore_ascii_case("api"));

    Ok(Settings {
        output,
        pretty: global.pretty,
        paginate: global.paginate,
        stream: global.stream,
        next: global.next.clone(),
        limit: global.limit,
        timeout,
        page_timeout,
        api_debug,
        strict_auth: global.strict_auth,
        base_url: global.base_url.clone(),
    })
}

/// `ASC_DEFAULT_OUTPUT`, then the config file, then JSON. Invalid values
/// warn and fall back.
fn default_output(config: &Config) -> OutputFormat {
    let candidates = [
        (ENV_DEFAULT_OUTPUT, env_var(ENV_DEFAULT_OUTPUT)),
        ("default_output", config.defaults.default_output.clone()),
    ];
    for (source, value) in candidates {
        let Some(value) = value else { continue };
        match OutputFormat::parse(&value) {
            Ok(format) => return format,
            Err(_) => {
                print_warning(&format!("ignoring invalid {source} {value:?}; using json"));
                return OutputFormat::Json;
            }
        }
    }
    OutputFormat::Json
}

/// Runs the command selected by `matches`.
///
/// Global flag combinations are checked before any credential or network
/// work. The whole command runs under the invocation deadline.
pub async fn run(matches: &ArgMatches) -> Result<(), AscError> {
    let global = GlobalOptions::from_arg_matches(matches).map_err(|e| AscError::usage(e.to_string()))?;
    let config = Config::load()?;
    let settings = settings(&global, &config)?;
    settings.validate()?;

    let ctx = InvocationContext::new(settings, config);
    ctx.deadline().run(dispatch(&ctx, matches)).await
}

async fn dispatch(ctx: &InvocationContext, matches: &ArgMatches) -> Result<(), AscError> {
    let name = matches
        .subcommand_name()
        .ok_or_else(|| AscError::usage("a command is required"))?;

    if Commands::has_subcommand(name) {
        let command = Commands::from_arg_matches(matches).map_err(|e| AscError::usage(e.to_string()))?;
        return command.run(ctx).await;
    }

    let (binding, leaf) = bindings::locate(matches)
        .ok_or_else(|| AscError::usage(format!("unknown command {name:?}")))?;
    tracing::debug!(command = %binding.command_path(), "running binding");
    let values = bindings::FlagValues::from_matches(binding, leaf);
    bindings::execute(ctx, binding, &values).await
}
