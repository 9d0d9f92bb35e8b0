//
//  asc-cli
//  cli/validate.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Submission readiness commands

use clap::{Args, Subcommand};

use crate::context::{BuildQuery, InvocationContext, Platform, VersionQuery};
use crate::error::AscError;
use crate::output::OutputWriter;
use crate::validation::{
    evaluate_submission, evaluate_testflight, fetch_submission_graph, fetch_testflight_graph, Report,
};

/// Check a version or build for submission readiness
#[derive(Args, Debug)]
#[command(
    args_conflicts_with_subcommands = true,
    after_help = "Exit status is 64 when blocking issues are found (errors, or warnings with --strict).\n\n\
                  Examples:\n  \
                  asc validate --app 123456789 --version 1.4.0\n  \
                  asc validate testflight --app 123456789 --build 987654321"
)]
pub struct ValidateCommand {
    #[command(subcommand)]
    pub command: Option<ValidateSubcommand>,

    #[command(flatten)]
    pub args: SubmissionArgs,
}

#[derive(Subcommand, Debug)]
pub enum ValidateSubcommand {
    /// Check a build for TestFlight distribution
    Testflight(TestFlightArgs),
}

#[derive(Args, Debug, Default)]
pub struct SubmissionArgs {
    /// App ID, bundle ID or exact name [env: ASC_APP_ID]
    #[arg(long)]
    pub app: Option<String>,

    /// Version string, e.g. 1.4.0
    #[arg(long)]
    pub version: Option<String>,

    /// Version ID
    #[arg(long)]
    pub version_id: Option<String>,

    /// Platform: IOS, MAC_OS, TV_OS or VISION_OS
    #[arg(long)]
    pub platform: Option<String>,

    /// Treat warnings as blocking
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Default)]
pub struct TestFlightArgs {
    /// App ID, bundle ID or exact name [env: ASC_APP_ID]
    #[arg(long)]
    pub app: Option<String>,

    /// Build ID
    #[arg(long)]
    pub build: Option<String>,

    /// Build number (CFBundleVersion), resolved within the app
    #[arg(long, conflicts_with = "build")]
    pub build_number: Option<String>,

    /// Platform: IOS, MAC_OS, TV_OS or VISION_OS
    #[arg(long)]
    pub platform: Option<String>,

    /// Treat warnings as blocking
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        match &self.command {
            Some(ValidateSubcommand::Testflight(args)) => testflight(ctx, args).await,
            None => submission(ctx, &self.args).await,
        }
    }
}

async fn submission(ctx: &InvocationContext, args: &SubmissionArgs) -> Result<(), AscError> {
    let app = ctx
        .app_default(args.app.as_deref())
        .ok_or_else(|| AscError::usage("--app is required"))?;
    if args.version.is_none() && args.version_id.is_none() {
        return Err(AscError::usage("--version or --version-id is required"));
    }
    let platform = args.platform.as_deref().map(Platform::parse).transpose()?;
    let output = ctx.output()?;

    let resolver = ctx.resolver()?;
    let app_id = resolver.resolve_app(&app).await?;
    let version = resolver
        .resolve_version(&VersionQuery {
            version_id: args.version_id.clone(),
            version: args.version.clone(),
            app_id: Some(app_id.clone()),
            platform,
        })
        .await?;

    let graph = fetch_submission_graph(ctx.client()?, &app_id, &version.id).await?;
    let mut report = Report::new(app_id, evaluate_submission(&graph), args.strict);
    report.version_id = Some(graph.version_id.clone());
    report.version_string = Some(graph.version_string.clone()).filter(|v| !v.is_empty());
    report.platform = Some(graph.platform.clone()).filter(|p| !p.is_empty());

    finish(&output, &report)
}

async fn testflight(ctx: &InvocationContext, args: &TestFlightArgs) -> Result<(), AscError> {
    let app = ctx
        .app_default(args.app.as_deref())
        .ok_or_else(|| AscError::usage("--app is required"))?;
    if args.build.is_none() && args.build_number.is_none() {
        return Err(AscError::usage("--build is required"));
    }
    let platform = args.platform.as_deref().map(Platform::parse).transpose()?;
    let output = ctx.output()?;

    let resolver = ctx.resolver()?;
    let app_id = resolver.resolve_app(&app).await?;
    let build_id = resolver
        .resolve_build(&BuildQuery {
            build_id: args.build.clone(),
            build_number: args.build_number.clone(),
            app_id: Some(app_id.clone()),
            platform,
        })
        .await?;

    let graph = fetch_testflight_graph(ctx.client()?, &app_id, &build_id).await?;
    let mut report = Report::new(app_id, evaluate_testflight(&graph), args.strict);
    report.build_id = Some(build_id);

    finish(&output, &report)
}

/// Renders the report, then fails if anything blocks.
fn finish(output: &OutputWriter, report: &Report) -> Result<(), AscError> {
    output.write(report)?;
    match report.blocking_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
