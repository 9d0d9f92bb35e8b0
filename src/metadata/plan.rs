//
//  asc-cli
//  metadata/plan.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Field-level planning.
//!
//! Every `(locale, field)` in the union of both sides lands in at most one of
//! `adds`, `updates` or `deletes`. Each list is sorted by
//! `(scope, locale, field)`, so identical inputs always give identical plans.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{EffectiveLocal, FieldMap, LocaleFields, RemoteSnapshot, Scope};

pub const REASON_ADD: &str = "field exists locally but not remotely";
pub const REASON_UPDATE: &str = "field value differs";
pub const REASON_DELETE: &str = "field exists remotely but not locally";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One field-level difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub key: String,
    pub scope: Scope,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub field: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl PlanItem {
    fn new(scope: Scope, version: Option<&str>, locale: &str, field: &str, reason: &str) -> Self {
        Self {
            key: plan_key(scope, version, locale, field),
            scope,
            locale: locale.to_string(),
            version: version.map(String::from),
            field: field.to_string(),
            reason: reason.to_string(),
            from: None,
            to: None,
        }
    }

    pub fn add(scope: Scope, version: Option<&str>, locale: &str, field: &str, to: &str) -> Self {
        Self {
            to: Some(to.to_string()),
            ..Self::new(scope, version, locale, field, REASON_ADD)
        }
    }

    pub fn update(scope: Scope, version: Option<&str>, locale: &str, field: &str, from: &str, to: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            ..Self::new(scope, version, locale, field, REASON_UPDATE)
        }
    }

    pub fn delete(scope: Scope, version: Option<&str>, locale: &str, field: &str, from: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            ..Self::new(scope, version, locale, field, REASON_DELETE)
        }
    }

    fn sort_key(&self) -> (Scope, &str, &str) {
        (self.scope, &self.locale, &self.field)
    }
}

/// `app-info:<locale>:<field>` or `version:<version>:<locale>:<field>`.
pub fn plan_key(scope: Scope, version: Option<&str>, locale: &str, field: &str) -> String {
    match (scope, version) {
        (Scope::Version, Some(version)) => format!("{scope}:{version}:{locale}:{field}"),
        _ => format!("{scope}:{locale}:{field}"),
    }
}

/// Number of field changes in one locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub adds: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl FieldChanges {
    pub fn any(&self) -> bool {
        self.adds + self.updates + self.deletes > 0
    }
}

/// Counts field changes between a local and a remote localization.
pub fn count_changes(fields: &[&str], local: Option<&FieldMap>, remote: Option<&FieldMap>) -> FieldChanges {
    let mut changes = FieldChanges::default();
    for field in fields {
        let local = local.and_then(|m| m.get(*field));
        let remote = remote.and_then(|m| m.get(*field));
        match (local, remote) {
            (Some(_), None) => changes.adds += 1,
            (None, Some(_)) => changes.deletes += 1,
            (Some(l), Some(r)) if l != r => changes.updates += 1,
            _ => {}
        }
    }
    changes
}

/// Localization requests a scope needs, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

/// One line of the `apiCalls` summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCall {
    pub operation: &'static str,
    pub scope: Scope,
    pub count: usize,
}

/// The plan for one scope, before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopePlan {
    pub adds: Vec<PlanItem>,
    pub updates: Vec<PlanItem>,
    pub deletes: Vec<PlanItem>,
    pub calls: CallCounts,
}

/// Diffs one scope.
pub fn plan_scope(scope: Scope, version: Option<&str>, local: &LocaleFields, remote: &LocaleFields) -> ScopePlan {
    let mut plan = ScopePlan::default();
    let locales: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    for locale in locales {
        let local_fields = local.get(locale);
        let remote_fields = remote.get(locale);

        for field in scope.fields() {
            let l = local_fields.and_then(|m| m.get(*field));
            let r = remote_fields.and_then(|m| m.get(*field));
            match (l, r) {
                (Some(to), None) => plan.adds.push(PlanItem::add(scope, version, locale, field, to)),
                (None, Some(from)) => plan.deletes.push(PlanItem::delete(scope, version, locale, field, from)),
                (Some(to), Some(from)) if to != from => {
                    plan.updates.push(PlanItem::update(scope, version, locale, field, from, to))
                }
                _ => {}
            }
        }

        let changes = count_changes(scope.fields(), local_fields, remote_fields);
        if !changes.any() {
            continue;
        }
        match (local_fields.is_some(), remote_fields.is_some()) {
            (true, false) => plan.calls.create += 1,
            (false, true) => plan.calls.delete += 1,
            (true, true) if changes.deletes > 0 => {
                plan.calls.delete += 1;
                plan.calls.create += 1;
            }
            _ => plan.calls.update += 1,
        }
    }

    plan
}

/// The merged, ordered plan across scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub adds: Vec<PlanItem>,
    pub updates: Vec<PlanItem>,
    pub deletes: Vec<PlanItem>,
    pub api_calls: Vec<ApiCall>,
}

impl Plan {
    pub fn build(local: &EffectiveLocal, remote: &RemoteSnapshot, version: &str, includes: &[Scope]) -> Self {
        let scopes = includes.iter().map(|&scope| {
            let version = (scope == Scope::Version).then_some(version);
            (scope, plan_scope(scope, version, local.scope(scope), &remote.fields(scope)))
        });
        Self::merge(scopes)
    }

    /// Merges per-scope plans, sorting each list.
    pub fn merge(scopes: impl IntoIterator<Item = (Scope, ScopePlan)>) -> Self {
        let mut plan = Plan::default();
        for (scope, part) in scopes {
            plan.adds.extend(part.adds);
            plan.updates.extend(part.updates);
            plan.deletes.extend(part.deletes);

            for (operation, count) in [
                ("create_localization", part.calls.create),
                ("delete_localization", part.calls.delete),
                ("update_localization", part.calls.update),
            ] {
                if count > 0 {
                    plan.api_calls.push(ApiCall { operation, scope, count });
                }
            }
        }

        for list in [&mut plan.adds, &mut plan.updates, &mut plan.deletes] {
            list.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        }
        plan.api_calls.sort_by(|a, b| (a.scope, a.operation).cmp(&(b.scope, b.operation)));
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

pub fn plan_headers() -> Vec<String> {
    ["change", "key", "from", "to", "reason"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

/// Table rows for a plan, adds first.
pub fn plan_rows(adds: &[PlanItem], updates: &[PlanItem], deletes: &[PlanItem]) -> Vec<Vec<String>> {
    let groups = [
        (ChangeKind::Add, adds),
        (ChangeKind::Update, updates),
        (ChangeKind::Delete, deletes),
    ];
    groups
        .iter()
        .flat_map(|(kind, items)| {
            items.iter().map(move |item| {
                vec![
                    kind.as_str().to_string(),
                    item.key.clone(),
                    item.from.clone().unwrap_or_default(),
                    item.to.clone().unwrap_or_default(),
                    item.reason.clone(),
                ]
            })
        })
        .collect()
}
