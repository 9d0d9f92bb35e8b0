//
//  asc-cli
//  cli/metadata.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Metadata reconciliation commands

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::context::{InvocationContext, Platform};
use crate::error::AscError;
use crate::metadata::{push, PushOptions, Scope};

/// Reconcile localized metadata with local files
#[derive(Args, Debug)]
pub struct MetadataCommand {
    #[command(subcommand)]
    pub command: MetadataSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MetadataSubcommand {
    /// Plan and apply local metadata to App Store Connect
    #[command(after_help = "Examples:\n  \
        asc metadata push --app 123456789 --version 1.4.0 --dir ./metadata --dry-run\n  \
        asc metadata push --app com.example.app --version 1.4.0 --dir ./metadata --allow-deletes --confirm")]
    Push(PushArgs),
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// App ID, bundle ID or exact name [env: ASC_APP_ID]
    #[arg(long)]
    pub app: Option<String>,

    /// Version string, e.g. 1.4.0
    #[arg(long)]
    pub version: String,

    /// Platform: IOS, MAC_OS, TV_OS or VISION_OS
    #[arg(long)]
    pub platform: Option<String>,

    /// Metadata directory
    #[arg(long)]
    pub dir: PathBuf,

    /// Scopes to reconcile: app-info, version (comma separated)
    #[arg(long, default_value = "app-info,version")]
    pub include: String,

    /// Print the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete remote values missing locally
    #[arg(long)]
    pub allow_deletes: bool,

    /// Confirm destructive operations
    #[arg(long)]
    pub confirm: bool,
}

impl MetadataCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        match &self.command {
            MetadataSubcommand::Push(args) => push_metadata(ctx, args).await,
        }
    }
}

async fn push_metadata(ctx: &InvocationContext, args: &PushArgs) -> Result<(), AscError> {
    let includes = Scope::parse_includes(&args.include)?;
    let platform = args.platform.as_deref().map(Platform::parse).transpose()?;
    let app = ctx
        .app_default(args.app.as_deref())
        .ok_or_else(|| AscError::usage("--app is required"))?;
    if args.version.trim().is_empty() {
        return Err(AscError::usage("--version is required"));
    }
    if args.dir.as_os_str().is_empty() {
        return Err(AscError::usage("--dir is required"));
    }

    let output = ctx.output()?;
    let resolver = ctx.resolver()?;
    let app_id = resolver.resolve_app(&app).await?;

    let opts = PushOptions {
        app_id,
        version: args.version.trim().to_string(),
        platform,
        dir: args.dir.clone(),
        includes,
        dry_run: args.dry_run,
        allow_deletes: args.allow_deletes,
        confirm: args.confirm,
    };
    let result = push(ctx.client()?, resolver, &opts).await?;
    output.write(&result)
}
