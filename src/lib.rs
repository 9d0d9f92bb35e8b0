//
//  asc-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # App Store Connect CLI Library
//!
//! The core of the `asc` command-line tool: everything every subcommand shares
//! when it talks to the App Store Connect REST API.
//!
//! ## Overview
//!
//! A command invocation flows through the crate like this:
//!
//! 1. [`cli`] parses argv into a command path and flags, resolving defaults
//!    from `ASC_*` environment variables and the config file.
//! 2. Endpoint binding records (see [`cli::bindings`]) turn flags into a
//!    [`api::RequestDescriptor`].
//! 3. The [`context::ResourceResolver`] rewrites user-friendly identifiers
//!    (bundle IDs, app names, version strings, build numbers) into resource IDs.
//! 4. The [`api::AscClient`] signs the request with a short-lived JWT from
//!    [`auth::TokenManager`], sends it, and retries transient failures.
//! 5. The [`api::Paginator`] walks `links.next` chains, aggregated or streamed.
//! 6. The [`output::OutputWriter`] renders the result as JSON, NDJSON, a table
//!    or markdown.
//!
//! Metadata reconciliation ([`metadata`]) and submission checks
//! ([`validation`]) orchestrate several of these calls before rendering.
//!
//! ## Module Structure
//!
//! - [`cli`]: Command tree, global flags, endpoint bindings and dispatch
//! - [`api`]: Transport, JSON:API response model, pagination, fan-out
//! - [`auth`]: Credential resolution and JWT minting
//! - [`config`]: Configuration file management
//! - [`context`]: Per-invocation settings, deadline and resource resolver
//! - [`metadata`]: Local/remote metadata plan and apply
//! - [`validation`]: Submission-readiness rules engine
//! - [`output`]: Output formatting (JSON, NDJSON, table, markdown)
//! - [`error`]: Error taxonomy and exit-code mapping
//! - [`util`]: Small shared helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use asc_cli::api::{AscClient, Paginator, RequestDescriptor};
//! use asc_cli::auth::StaticToken;
//!
//! # async fn demo() -> Result<(), asc_cli::AscError> {
//! let client = AscClient::new(Arc::new(StaticToken::new("token")))?;
//! let apps = Paginator::new(&client)
//!     .paginate_all(&RequestDescriptor::get("/v1/apps").query("limit", "200"))
//!     .await?;
//! println!("{} apps", apps.resources().len());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains the clap command tree, the global flags, the data-driven endpoint
/// bindings and the top-level dispatcher.
pub mod cli;

/// App Store Connect API transport.
///
/// Request descriptors, the authenticated HTTP client with retries, the
/// JSON:API response model, pagination and the bounded worker pool.
pub mod api;

/// API key credentials and JWT minting.
pub mod auth;

/// Configuration file management.
///
/// Manages the non-secret defaults stored in platform-specific locations
/// (or wherever `ASC_CONFIG_PATH` points):
/// - Linux: `~/.config/asc/config.toml`
/// - macOS: `~/Library/Application Support/asc/config.toml`
/// - Windows: `%APPDATA%\asc\config.toml`
pub mod config;

/// Per-invocation context: resolved settings, the deadline and the
/// resource resolver.
pub mod context;

/// Error taxonomy shared by every layer.
pub mod error;

/// Metadata reconciliation (local files against App Store Connect).
pub mod metadata;

/// Output formatting for different modes.
///
/// Provides formatters for:
/// - JSON: compact or pretty, the default for scripting
/// - NDJSON: one object per line, used by streamed pagination
/// - Table: human-readable tables for interactive use
/// - Markdown: pipe tables for reports and plans
pub mod output;

/// Submission-readiness validation.
pub mod validation;

/// Utility functions and helpers.
pub mod util;

pub use config::Config;
pub use error::AscError;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
pub const APP_NAME: &str = "asc";

/// Application version constant, derived from Cargo.toml at compile time.
///
/// # Example
///
/// ```rust
/// use asc_cli::VERSION;
///
/// println!("asc version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Scripts can rely on these to tell a bad invocation from a failed API call
/// or a failed validation report.
///
/// # Example
///
/// ```rust,no_run
/// use asc_cli::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::USAGE);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// Runtime error.
    ///
    /// Transport, API, resolver, pagination or auth failure. Check stderr for
    /// details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    ///
    /// The command was invoked with invalid arguments or options, or a flag
    /// value failed validation. Use `--help` to see correct usage.
    pub const USAGE: i32 = 2;

    /// A report was produced and it contains blocking issues.
    ///
    /// Used by `validate` when errors (or warnings in strict mode) are found.
    /// The report itself has already been written to stdout.
    pub const REPORTED: i32 = 64;
}
