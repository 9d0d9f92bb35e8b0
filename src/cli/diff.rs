//
//  asc-cli
//  cli/diff.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Read-only comparison commands

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::context::{InvocationContext, Platform, VersionQuery};
use crate::error::AscError;
use crate::metadata::{diff_localizations, DiffMode};

/// Compare localizations without changing anything
#[derive(Args, Debug)]
pub struct DiffCommand {
    #[command(subcommand)]
    pub command: DiffSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DiffSubcommand {
    /// Compare version localizations, local against remote or remote against remote
    #[command(after_help = "Examples:\n  \
        asc diff localizations --app 123456789 --path ./metadata/version/1.4.0 --version 1.4.0\n  \
        asc diff localizations --from-version-id 111 --to-version-id 222")]
    Localizations(LocalizationsArgs),
}

#[derive(Args, Debug)]
pub struct LocalizationsArgs {
    /// App ID, bundle ID or exact name [env: ASC_APP_ID]
    #[arg(long)]
    pub app: Option<String>,

    /// Directory of <locale>.json files
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Version string to compare against
    #[arg(long)]
    pub version: Option<String>,

    /// Version ID to compare against
    #[arg(long)]
    pub version_id: Option<String>,

    /// Platform: IOS, MAC_OS, TV_OS or VISION_OS
    #[arg(long)]
    pub platform: Option<String>,

    /// Remote version ID on the left side
    #[arg(long)]
    pub from_version_id: Option<String>,

    /// Remote version ID on the right side
    #[arg(long)]
    pub to_version_id: Option<String>,
}

impl DiffCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        match &self.command {
            DiffSubcommand::Localizations(args) => localizations(ctx, args).await,
        }
    }
}

async fn localizations(ctx: &InvocationContext, args: &LocalizationsArgs) -> Result<(), AscError> {
    let platform = args.platform.as_deref().map(Platform::parse).transpose()?;
    let query = VersionQuery {
        version_id: args.version_id.clone(),
        version: args.version.clone(),
        app_id: None,
        platform,
    };
    let mut mode = DiffMode::from_flags(
        args.path.clone(),
        query,
        args.from_version_id.clone(),
        args.to_version_id.clone(),
    )?;

    let output = ctx.output()?;
    let resolver = ctx.resolver()?;

    // Looking a version up by string needs the app.
    if let DiffMode::Local { version, .. } = &mut mode {
        if version.version_id.is_none() {
            let app = ctx
                .app_default(args.app.as_deref())
                .ok_or_else(|| AscError::usage("--app is required with --version"))?;
            version.app_id = Some(resolver.resolve_app(&app).await?);
        }
    }

    let result = diff_localizations(ctx.client()?, resolver, &mode).await?;
    output.write(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Settings;
    use crate::Config;

    fn args() -> LocalizationsArgs {
        LocalizationsArgs {
            app: None,
            path: None,
            version: None,
            version_id: None,
            platform: None,
            from_version_id: None,
            to_version_id: None,
        }
    }

    #[tokio::test]
    async fn test_mixed_modes_rejected_before_network() {
        let ctx = InvocationContext::new(Settings::default(), Config::default());
        let args = LocalizationsArgs {
            path: Some(PathBuf::from("metadata")),
            version: Some("1.0".to_string()),
            from_version_id: Some("111".to_string()),
            ..args()
        };
        let err = localizations(&ctx, &args).await.unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("cannot be combined"));
    }

    #[tokio::test]
    async fn test_half_remote_pair_rejected() {
        let ctx = InvocationContext::new(Settings::default(), Config::default());
        let args = LocalizationsArgs {
            to_version_id: Some("222".to_string()),
            ..args()
        };
        let err = localizations(&ctx, &args).await.unwrap_err();
        assert!(err.to_string().contains("required together"));
    }
}
