//
//  asc-cli
//  metadata/apply.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Applying a plan.
//!
//! Work is grouped by `(scope, locale)` and runs in three phases: creates,
//! then updates, then deletes (including delete-and-recreate for locales
//! that lost a field). The first failure stops the run; earlier requests
//! stay applied.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::{AscClient, RequestDescriptor};
use crate::error::AscError;

use super::{count_changes, EffectiveLocal, FieldMap, RemoteLocalization, RemoteSnapshot, Scope};

/// One request the apply phase executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAction {
    pub scope: Scope,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localization_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Create,
    Update,
    Delete,
}

/// A locale that needs at least one request.
#[derive(Debug)]
struct LocaleWork<'a> {
    phase: Phase,
    scope: Scope,
    locale: &'a str,
    local: Option<&'a FieldMap>,
    remote: Option<&'a RemoteLocalization>,
}

/// Executes the plan's localization requests in phase order.
pub async fn apply_plan(
    client: &AscClient,
    local: &EffectiveLocal,
    remote: &RemoteSnapshot,
    version: &str,
    includes: &[Scope],
    allow_deletes: bool,
) -> Result<Vec<ApplyAction>, AscError> {
    let mut work = Vec::new();
    for &scope in includes {
        let local_locales = local.scope(scope);
        let remote_locales = remote.scope(scope);
        let locales: BTreeSet<&String> = local_locales.keys().chain(remote_locales.keys()).collect();

        for locale in locales {
            let l = local_locales.get(locale);
            let r = remote_locales.get(locale);
            let changes = count_changes(scope.fields(), l, r.map(|r| &r.fields));
            if !changes.any() {
                continue;
            }
            let phase = match (l.is_some(), r.is_some()) {
                (true, false) => Phase::Create,
                (true, true) if changes.deletes == 0 => Phase::Update,
                _ => Phase::Delete,
            };
            work.push(LocaleWork {
                phase,
                scope,
                locale,
                local: l,
                remote: r,
            });
        }
    }
    work.sort_by(|a, b| (a.phase, a.scope, a.locale).cmp(&(b.phase, b.scope, b.locale)));

    let mut actions = Vec::new();
    for item in work {
        let version = (item.scope == Scope::Version).then_some(version);
        let key = match version {
            Some(v) => format!("{}:{v}:{}", item.scope, item.locale),
            None => format!("{}:{}", item.scope, item.locale),
        };
        apply_locale(client, remote, &item, version, allow_deletes, &mut actions)
            .await
            .map_err(|source| AscError::Apply {
                key,
                source: Box::new(source),
            })?;
    }
    Ok(actions)
}

async fn apply_locale(
    client: &AscClient,
    remote: &RemoteSnapshot,
    item: &LocaleWork<'_>,
    version: Option<&str>,
    allow_deletes: bool,
    actions: &mut Vec<ApplyAction>,
) -> Result<(), AscError> {
    let scope = item.scope;
    let action = |name: &'static str, id: Option<String>| ApplyAction {
        scope,
        locale: item.locale.to_string(),
        version: version.map(String::from),
        action: name,
        localization_id: id,
    };

    match (item.local, item.remote) {
        (Some(fields), None) => {
            let id = create_localization(client, scope, remote.parent_id(scope), item.locale, fields).await?;
            actions.push(action("create", Some(id)));
        }
        (Some(fields), Some(existing)) if item.phase == Phase::Update => {
            let changed: FieldMap = fields
                .iter()
                .filter(|(k, v)| existing.fields.get(*k) != Some(*v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            update_localization(client, scope, &existing.id, &changed).await?;
            actions.push(action("update", Some(existing.id.clone())));
        }
        (Some(fields), Some(existing)) => {
            require_deletes(allow_deletes)?;
            delete_localization(client, scope, &existing.id).await?;
            actions.push(action("delete", Some(existing.id.clone())));
            let id = create_localization(client, scope, remote.parent_id(scope), item.locale, fields).await?;
            actions.push(action("create", Some(id)));
        }
        (None, Some(existing)) => {
            require_deletes(allow_deletes)?;
            delete_localization(client, scope, &existing.id).await?;
            actions.push(action("delete", Some(existing.id.clone())));
        }
        (None, None) => {}
    }
    Ok(())
}

fn require_deletes(allow_deletes: bool) -> Result<(), AscError> {
    if allow_deletes {
        Ok(())
    } else {
        Err(AscError::usage("--allow-deletes is required to apply delete operations"))
    }
}

fn attributes(fields: &FieldMap) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// `POST` a new localization under its parent. Returns the new ID.
pub async fn create_localization(
    client: &AscClient,
    scope: Scope,
    parent_id: &str,
    locale: &str,
    fields: &FieldMap,
) -> Result<String, AscError> {
    if scope == Scope::AppInfo && !fields.contains_key("name") {
        return Err(AscError::validation(format!(
            "cannot create app-info localization {locale:?} without name"
        )));
    }

    let mut attrs = attributes(fields);
    attrs.insert("locale".to_string(), Value::String(locale.to_string()));
    let (relationship, parent_type) = scope.parent_relationship();
    let body = json!({
        "data": {
            "type": scope.resource_type(),
            "attributes": attrs,
            "relationships": {
                relationship: { "data": { "type": parent_type, "id": parent_id } }
            }
        }
    });

    let doc = client
        .send(&RequestDescriptor::post(format!("/v1/{}", scope.resource_type()), body))
        .await?;
    doc.single()
        .map(|r| r.id.clone())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AscError::Decode(format!(
                "create {} response for {locale:?} carried no resource",
                scope.resource_type()
            ))
        })
}

/// `PATCH` the given fields of an existing localization.
pub async fn update_localization(
    client: &AscClient,
    scope: Scope,
    id: &str,
    fields: &FieldMap,
) -> Result<(), AscError> {
    let body = json!({
        "data": {
            "type": scope.resource_type(),
            "id": id,
            "attributes": attributes(fields),
        }
    });
    client
        .send(&RequestDescriptor::patch(format!("/v1/{}/{id}", scope.resource_type()), body))
        .await?;
    Ok(())
}

pub async fn delete_localization(client: &AscClient, scope: Scope, id: &str) -> Result<(), AscError> {
    client
        .execute(&RequestDescriptor::delete(format!("/v1/{}/{id}", scope.resource_type())))
        .await?
        .error_for_status()?;
    Ok(())
}
