//
//  asc-cli
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgMatches, Command};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use asc_cli::cli::{self, suggest::suggest, ENV_DEBUG};
use asc_cli::util::env_var;
use asc_cli::{exit_codes, AscError};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let root = cli::command();

    let matches = match root.clone().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(err) => std::process::exit(report_parse_error(&root, &args, err)),
    };

    init_logging(&matches);

    let result = tokio::select! {
        result = cli::run(&matches) => result,
        _ = tokio::signal::ctrl_c() => Err(AscError::interrupted()),
    };

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            if !matches!(e, AscError::Reported { .. }) {
                eprintln!("Error: {e}");
                if let Some(hint) = e.hint() {
                    eprintln!("Hint: {hint}");
                }
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Prints a clap error and returns the exit code.
///
/// Unknown subcommands get our own suggestion instead of clap's.
fn report_parse_error(root: &Command, args: &[String], err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            exit_codes::SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            let invalid = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::new(),
            };
            let (parent, path) = command_at(root, args, &invalid);
            eprintln!("Error: unknown command {invalid:?} for {path:?}");
            let names = cli::command_names(parent);
            if let Some(found) = suggest(&invalid, names.iter().map(String::as_str)) {
                eprintln!("\nDid you mean this?\n\t{found}");
            }
            eprintln!("\nRun '{path} --help' for usage.");
            exit_codes::USAGE
        }
        _ => {
            let _ = err.print();
            exit_codes::USAGE
        }
    }
}

/// Walks the typed words down the tree, stopping at the unknown one.
/// Returns the deepest known command and its path.
fn command_at<'a>(root: &'a Command, args: &[String], invalid: &str) -> (&'a Command, String) {
    let mut path = vec![root.get_name().to_string()];
    let mut current = root;
    for word in args.iter().skip(1) {
        if word == invalid {
            break;
        }
        if let Some(next) = current.find_subcommand(word) {
            path.push(next.get_name().to_string());
            current = next;
        }
    }
    (current, path.join(" "))
}

/// Logging to stderr. `--debug` wins; otherwise `ASC_DEBUG` selects the
/// level (`1`, `true`, `debug`), HTTP tracing (`api`) or a raw filter
/// directive. HTTP tracing adds `asc::http=info` on top.
fn init_logging(matches: &ArgMatches) {
    let flag = |name: &str| matches.try_get_one::<bool>(name).ok().flatten().copied().unwrap_or(false);
    let env = env_var(ENV_DEBUG);

    let mut directive = match env.as_deref() {
        _ if flag("debug") => "debug".to_string(),
        Some(v) if ["1", "true", "debug"].contains(&v.to_ascii_lowercase().as_str()) => "debug".to_string(),
        Some(v) if v.eq_ignore_ascii_case("api") => "warn".to_string(),
        Some(v) => v.to_string(),
        None => "warn".to_string(),
    };
    let api_debug = flag("api_debug") || env.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("api"));
    if api_debug {
        directive.push_str(",asc::http=info");
    }

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
