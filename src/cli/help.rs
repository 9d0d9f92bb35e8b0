//
//  asc-cli
//  cli/help.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Root help grouped by category.

use clap::Command;

/// Shown on every experimental command group.
pub const EXPERIMENTAL_BANNER: &str =
    "EXPERIMENTAL / UNOFFICIAL / DISCOURAGED: this command relies on endpoints Apple does not document. \
     It may break or change without notice.";

/// Command categories, in display order. Commands not listed land in "Other".
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("App Store", &["apps", "versions", "app-infos", "metadata", "diff", "validate", "reviews", "screenshots"]),
    ("Builds & TestFlight", &["builds", "beta-groups", "beta-testers"]),
    ("Monetization", &["subscriptions", "iap"]),
    ("Team & Signing", &["users", "bundle-ids", "certificates"]),
    ("Analytics", &["analytics"]),
    ("Experimental", &["nominations"]),
    ("Tooling", &["api", "auth", "config", "completion"]),
];

const ROOT_TEMPLATE: &str = "{before-help}{about-with-newline}\n{usage-heading} {usage}\n\n{after-help}\n{options}";

/// Replaces the flat subcommand list on the root with a grouped one.
pub fn with_grouped_help(cmd: Command) -> Command {
    let listing = grouped_listing(&cmd);
    cmd.help_template(ROOT_TEMPLATE).after_help(listing)
}

fn grouped_listing(cmd: &Command) -> String {
    let visible: Vec<&Command> = cmd.get_subcommands().filter(|c| !c.is_hide_set()).collect();
    let width = visible.iter().map(|c| c.get_name().len()).max().unwrap_or(0);

    let line = |c: &Command| {
        let about = c.get_about().map(|a| a.to_string()).unwrap_or_default();
        format!("  {:width$}  {about}\n", c.get_name())
    };

    let mut out = String::new();
    for (category, names) in CATEGORIES {
        let members: Vec<&&Command> = visible.iter().filter(|c| names.contains(&c.get_name())).collect();
        if members.is_empty() {
            continue;
        }
        out.push_str(&format!("{category}:\n"));
        for c in members {
            out.push_str(&line(c));
        }
        out.push('\n');
    }

    let others: Vec<&&Command> = visible
        .iter()
        .filter(|c| !CATEGORIES.iter().any(|(_, names)| names.contains(&c.get_name())))
        .collect();
    if !others.is_empty() {
        out.push_str("Other:\n");
        for c in others {
            out.push_str(&line(c));
        }
        out.push('\n');
    }

    out.push_str("Use 'asc <command> --help' for more information about a command.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_listing() {
        let cmd = Command::new("asc")
            .subcommand(Command::new("apps").about("Apps"))
            .subcommand(Command::new("auth").about("Auth"))
            .subcommand(Command::new("misc").about("Misc"))
            .subcommand(Command::new("secret").hide(true));
        let listing = grouped_listing(&cmd);

        let app_store = listing.find("App Store:").unwrap();
        let tooling = listing.find("Tooling:").unwrap();
        assert!(app_store < tooling);
        assert!(listing.contains("  apps  Apps"));
        assert!(listing.contains("Other:\n  misc  Misc"));
        assert!(!listing.contains("secret"));
        assert!(!listing.contains("Monetization"));
    }
}
