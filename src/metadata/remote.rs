//
//  asc-cli
//  metadata/remote.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! The remote side of a reconciliation: the editable app info, the target
//! version, and their localizations.

use std::collections::BTreeMap;

use crate::api::{AscClient, Paginator, RequestDescriptor, Resource};
use crate::context::{ResourceResolver, VersionQuery, MAX_LIMIT};
use crate::error::AscError;

use super::{FieldMap, LocaleFields, Scope};

/// App info state that accepts metadata edits.
pub const EDITABLE_APP_INFO_STATE: &str = "PREPARE_FOR_SUBMISSION";

/// One existing localization resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteLocalization {
    pub id: String,
    pub fields: FieldMap,
}

pub type RemoteLocales = BTreeMap<String, RemoteLocalization>;

/// What App Store Connect currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub app_info_id: String,
    pub app_info: RemoteLocales,
    pub version_id: String,
    pub version_string: String,
    pub version: RemoteLocales,
}

impl RemoteSnapshot {
    pub fn scope(&self, scope: Scope) -> &RemoteLocales {
        match scope {
            Scope::AppInfo => &self.app_info,
            Scope::Version => &self.version,
        }
    }

    /// Parent resource ID that new localizations of `scope` attach to.
    pub fn parent_id(&self, scope: Scope) -> &str {
        match scope {
            Scope::AppInfo => &self.app_info_id,
            Scope::Version => &self.version_id,
        }
    }

    /// Remote fields keyed by locale, without resource IDs.
    pub fn fields(&self, scope: Scope) -> LocaleFields {
        self.scope(scope)
            .iter()
            .map(|(locale, loc)| (locale.clone(), loc.fields.clone()))
            .collect()
    }
}

/// Fetches the app info and version sides concurrently.
///
/// Scopes left out of `includes` stay empty but their parent IDs are still
/// resolved, so results always name both.
pub async fn fetch_snapshot(
    client: &AscClient,
    resolver: &ResourceResolver,
    app_id: &str,
    version: &VersionQuery,
    includes: &[Scope],
) -> Result<RemoteSnapshot, AscError> {
    let app_info_side = async {
        let app_info_id = select_app_info(client, app_id).await?;
        let locales = if includes.contains(&Scope::AppInfo) {
            fetch_localizations(client, Scope::AppInfo, &app_info_id).await?
        } else {
            RemoteLocales::new()
        };
        Ok::<_, AscError>((app_info_id, locales))
    };

    let version_side = async {
        let version = resolver.resolve_version(version).await?;
        let locales = if includes.contains(&Scope::Version) {
            fetch_localizations(client, Scope::Version, &version.id).await?
        } else {
            RemoteLocales::new()
        };
        Ok::<_, AscError>((version, locales))
    };

    let ((app_info_id, app_info), (version, version_locales)) =
        tokio::try_join!(app_info_side, version_side)?;

    Ok(RemoteSnapshot {
        app_info_id,
        app_info,
        version_string: version.attr_str("versionString").unwrap_or_default().to_string(),
        version_id: version.id,
        version: version_locales,
    })
}

/// Picks the app info that accepts edits.
///
/// Prefers the one in `PREPARE_FOR_SUBMISSION`; an app with a single app
/// info uses that one.
pub async fn select_app_info(client: &AscClient, app_id: &str) -> Result<String, AscError> {
    let req = RequestDescriptor::get(format!("/v1/apps/{app_id}/appInfos")).query("limit", MAX_LIMIT.to_string());
    let mut infos = client.send(&req).await?.into_resources();

    let state = |info: &Resource| {
        info.attr_str("state")
            .or_else(|| info.attr_str("appStoreState"))
            .unwrap_or_default()
            .to_string()
    };

    if let Some(editable) = infos.iter().find(|i| state(i) == EDITABLE_APP_INFO_STATE) {
        return Ok(editable.id.clone());
    }
    match infos.len() {
        0 => Err(AscError::NotFound(format!("no app info found for app {app_id}"))),
        1 => Ok(infos.remove(0).id),
        _ => {
            let listed: Vec<String> = infos.iter().map(|i| format!("{}:{}", i.id, state(i))).collect();
            Err(AscError::Ambiguity(format!(
                "no app info in {EDITABLE_APP_INFO_STATE} for app {app_id} ({})",
                listed.join(", ")
            )))
        }
    }
}

/// Fetches every localization under a parent resource.
pub async fn fetch_localizations(client: &AscClient, scope: Scope, parent_id: &str) -> Result<RemoteLocales, AscError> {
    let path = match scope {
        Scope::AppInfo => format!("/v1/appInfos/{parent_id}/appInfoLocalizations"),
        Scope::Version => format!("/v1/appStoreVersions/{parent_id}/appStoreVersionLocalizations"),
    };
    let req = RequestDescriptor::get(path).query("limit", MAX_LIMIT.to_string());
    let doc = Paginator::new(client).paginate_all(&req).await?;

    let mut locales = RemoteLocales::new();
    for resource in doc.into_resources() {
        let locale = resource.attr_str("locale").unwrap_or_default().trim().to_string();
        if locale.is_empty() {
            continue;
        }
        let fields = localization_fields(&resource, scope);
        locales.insert(locale, RemoteLocalization { id: resource.id, fields });
    }
    Ok(locales)
}

/// The canonical fields of a localization resource, trimmed, empties dropped.
pub fn localization_fields(resource: &Resource, scope: Scope) -> FieldMap {
    scope
        .fields()
        .iter()
        .filter_map(|field| {
            let value = resource.attr_str(field)?.trim();
            (!value.is_empty()).then(|| (field.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use mockito::Matcher;
    use std::sync::Arc;

    fn client(server: &mockito::ServerGuard) -> AscClient {
        AscClient::new(Arc::new(StaticToken::new("test-token")))
            .unwrap()
            .with_base_url(&server.url())
            .unwrap()
    }

    #[test]
    fn test_localization_fields_ignores_other_attributes() {
        let resource = Resource::new("appStoreVersionLocalizations", "1")
            .with_attribute("locale", "en-US")
            .with_attribute("description", " Sync ")
            .with_attribute("whatsNew", "")
            .with_attribute("keywords", serde_json::Value::Null);
        let fields = localization_fields(&resource, Scope::Version);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["description"], "Sync");
    }

    #[tokio::test]
    async fn test_select_single_app_info() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/apps/app-1/appInfos")
            .match_query(Matcher::Any)
            .with_body(r#"{"data":[{"type":"appInfos","id":"info-9","attributes":{"state":"READY_FOR_DISTRIBUTION"}}]}"#)
            .create_async()
            .await;
        assert_eq!(select_app_info(&client(&server), "app-1").await.unwrap(), "info-9");
    }

    #[tokio::test]
    async fn test_no_editable_app_info_among_many() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/apps/app-1/appInfos")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"data":[
                    {"type":"appInfos","id":"a","attributes":{"state":"READY_FOR_DISTRIBUTION"}},
                    {"type":"appInfos","id":"b","attributes":{"state":"REPLACED_WITH_NEW_INFO"}}
                ]}"#,
            )
            .create_async()
            .await;
        let err = select_app_info(&client(&server), "app-1").await.unwrap_err();
        assert!(matches!(err, AscError::Ambiguity(_)));
    }
}
