//
//  asc-cli
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Configuration management commands
//!
//! Reads and writes the non-secret defaults in `config.toml`. Keys are flat
//! names (see [`VALID_KEYS`]); their table placement in the file is handled
//! by [`Config`].

use std::path::Path;

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::config::{Config, VALID_KEYS};
use crate::context::InvocationContext;
use crate::error::AscError;
use crate::output::{OutputFormat, TableOutput};

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Remove a configuration value
    Unset(UnsetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show the configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key
    pub key: String,
}

/// One key and its value, if set.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl TableOutput for ConfigValue {
    fn fields(&self) -> Vec<(String, String)> {
        vec![(self.key.clone(), self.value.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        Vec::new()
    }
}

/// Every set key plus the file they live in.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigListing {
    pub path: String,
    pub values: std::collections::BTreeMap<String, String>,
}

impl TableOutput for ConfigListing {
    fn fields(&self) -> Vec<(String, String)> {
        vec![("Path".to_string(), self.path.clone())]
    }

    fn headers(&self) -> Vec<String> {
        vec!["key".to_string(), "value".to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        VALID_KEYS
            .iter()
            .filter_map(|key| self.values.get(*key).map(|v| vec![key.to_string(), v.clone()]))
            .collect()
    }
}

/// The configuration file location.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPath {
    pub path: String,
    pub exists: bool,
}

impl TableOutput for ConfigPath {
    fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("Path".to_string(), self.path.clone()),
            ("Exists".to_string(), self.exists.to_string()),
        ]
    }

    fn headers(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        Vec::new()
    }
}

impl ConfigCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        let path = Config::config_path()?;
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(ctx, args),
            ConfigSubcommand::Set(args) => self.set(ctx, &path, args),
            ConfigSubcommand::Unset(args) => self.unset(ctx, &path, args),
            ConfigSubcommand::List => self.list(ctx, &path),
            ConfigSubcommand::Path => ctx.output()?.write(&ConfigPath {
                exists: path.is_file(),
                path: path.display().to_string(),
            }),
        }
    }

    /// Get a configuration value
    fn get(&self, ctx: &InvocationContext, args: &GetArgs) -> Result<(), AscError> {
        check_key(&args.key)?;
        ctx.output()?.write(&ConfigValue {
            key: args.key.clone(),
            value: ctx.config.get(&args.key),
            changed: None,
        })
    }

    /// Set a configuration value
    fn set(&self, ctx: &InvocationContext, path: &Path, args: &SetArgs) -> Result<(), AscError> {
        check_key(&args.key)?;
        let mut config = ctx.config.clone();
        config
            .set(&args.key, &args.value)
            .map_err(|e| AscError::validation(format!("{e:#}")))?;
        config.save_to(path)?;
        tracing::debug!(key = %args.key, path = %path.display(), "config value set");

        let writer = ctx.output()?;
        if writer.format() == OutputFormat::Table {
            eprintln!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                args.value.trim()
            );
        }
        writer.write(&ConfigValue {
            key: args.key.clone(),
            value: config.get(&args.key),
            changed: Some(true),
        })
    }

    /// Unset a configuration value
    fn unset(&self, ctx: &InvocationContext, path: &Path, args: &UnsetArgs) -> Result<(), AscError> {
        check_key(&args.key)?;
        let mut config = ctx.config.clone();
        let changed = config.unset(&args.key)?;
        if changed {
            config.save_to(path)?;
        }

        let writer = ctx.output()?;
        if writer.format() == OutputFormat::Table {
            eprintln!("{} Unset {}", style("✓").green(), style(&args.key).cyan());
        }
        writer.write(&ConfigValue {
            key: args.key.clone(),
            value: None,
            changed: Some(changed),
        })
    }

    /// List all configuration values
    fn list(&self, ctx: &InvocationContext, path: &Path) -> Result<(), AscError> {
        let values = ctx
            .config
            .entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ctx.output()?.write(&ConfigListing {
            path: path.display().to_string(),
            values,
        })
    }
}

fn check_key(key: &str) -> Result<(), AscError> {
    if VALID_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(AscError::usage(format!(
            "unknown configuration key '{key}'. Valid keys: {}",
            VALID_KEYS.join(", ")
        )))
    }
}
