//
//  asc-cli
//  metadata/diff.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Read-only comparison of version localizations.

use std::path::PathBuf;

use serde::Serialize;

use crate::api::AscClient;
use crate::context::{ResourceResolver, VersionQuery};
use crate::error::AscError;
use crate::output::TableOutput;

use super::{
    fetch_localizations, load_locale_dir, plan_headers, plan_rows, plan_scope, LocaleFields, PlanItem, RemoteLocales,
    Scope,
};

/// What `diff localizations` compares.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffMode {
    /// A directory of `<locale>.json` files against a remote version.
    Local { path: PathBuf, version: VersionQuery },
    /// One remote version against another.
    Remote { from_version_id: String, to_version_id: String },
}

impl DiffMode {
    /// Picks the mode from the flags. Mixing the two modes is a usage error.
    pub fn from_flags(
        path: Option<PathBuf>,
        version: VersionQuery,
        from_version_id: Option<String>,
        to_version_id: Option<String>,
    ) -> Result<Self, AscError> {
        let remote_mode = from_version_id.is_some() || to_version_id.is_some();
        let local_mode = path.is_some() || version.version.is_some() || version.version_id.is_some();

        match (local_mode, remote_mode) {
            (true, true) => Err(AscError::usage(
                "--path/--version cannot be combined with --from-version-id/--to-version-id",
            )),
            (false, true) => match (from_version_id, to_version_id) {
                (Some(from_version_id), Some(to_version_id)) => Ok(Self::Remote {
                    from_version_id,
                    to_version_id,
                }),
                _ => Err(AscError::usage(
                    "--from-version-id and --to-version-id are required together",
                )),
            },
            _ => {
                let path = path.ok_or_else(|| AscError::usage("--path is required"))?;
                if version.version.is_none() && version.version_id.is_none() {
                    return Err(AscError::usage("--version or --version-id is required with --path"));
                }
                Ok(Self::Local { path, version })
            }
        }
    }
}

/// Differences between two sets of version localizations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub from: String,
    pub to: String,
    pub adds: Vec<PlanItem>,
    pub updates: Vec<PlanItem>,
    pub deletes: Vec<PlanItem>,
}

impl TableOutput for DiffResult {
    fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("From".to_string(), self.from.clone()),
            ("To".to_string(), self.to.clone()),
        ]
    }

    fn headers(&self) -> Vec<String> {
        plan_headers()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        plan_rows(&self.adds, &self.updates, &self.deletes)
    }
}

/// Runs the comparison. Never mutates anything.
pub async fn diff_localizations(
    client: &AscClient,
    resolver: &ResourceResolver,
    mode: &DiffMode,
) -> Result<DiffResult, AscError> {
    match mode {
        DiffMode::Local { path, version } => {
            let local = load_locale_dir(path, Scope::Version)?;
            if local.locales.is_empty() && local.default.is_none() {
                return Err(AscError::usage(format!(
                    "no localization .json files found in {}",
                    path.display()
                )));
            }

            let remote_version = resolver.resolve_version(version).await?;
            let label = remote_version
                .attr_str("versionString")
                .unwrap_or(&remote_version.id)
                .to_string();
            let remote = fetch_localizations(client, Scope::Version, &remote_version.id).await?;
            let remote_fields: LocaleFields = remote
                .iter()
                .map(|(locale, loc)| (locale.clone(), loc.fields.clone()))
                .collect();
            let desired = local.with_fallback(remote.keys(), false);

            let plan = plan_scope(Scope::Version, Some(&label), &desired, &remote_fields);
            Ok(DiffResult {
                from: format!("remote:{}", remote_version.id),
                to: format!("local:{}", path.display()),
                adds: plan.adds,
                updates: plan.updates,
                deletes: plan.deletes,
            })
        }
        DiffMode::Remote {
            from_version_id,
            to_version_id,
        } => {
            let (from, to) = tokio::try_join!(
                fetch_localizations(client, Scope::Version, from_version_id),
                fetch_localizations(client, Scope::Version, to_version_id),
            )?;
            let fields = |side: &RemoteLocales| -> LocaleFields {
                side.iter()
                    .map(|(locale, loc)| (locale.clone(), loc.fields.clone()))
                    .collect()
            };
            let plan = plan_scope(Scope::Version, None, &fields(&to), &fields(&from));
            Ok(DiffResult {
                from: format!("remote:{from_version_id}"),
                to: format!("remote:{to_version_id}"),
                adds: plan.adds,
                updates: plan.updates,
                deletes: plan.deletes,
            })
        }
    }
}
