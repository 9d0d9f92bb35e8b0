//
//  asc-cli
//  validation/graph.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Fetching the resources the rules look at.

use tracing::debug;

use crate::api::{fan_out, AscClient, Paginator, RequestDescriptor, Resource, DEFAULT_CONCURRENCY};
use crate::context::MAX_LIMIT;
use crate::error::AscError;
use crate::metadata::{localization_fields, select_app_info, FieldMap, Scope};

/// A localization with its canonical fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localization {
    pub id: String,
    pub locale: String,
    pub fields: FieldMap,
}

/// One uploaded screenshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screenshot {
    pub id: String,
    pub file_name: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

/// A screenshot set under a version localization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenshotSet {
    pub id: String,
    pub display_type: String,
    pub locale: String,
    pub screenshots: Vec<Screenshot>,
}

/// Everything a submission check needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionGraph {
    pub app_id: String,
    pub primary_locale: Option<String>,
    pub version_id: String,
    pub version_string: String,
    pub platform: String,
    pub version_localizations: Vec<Localization>,
    pub app_info_localizations: Vec<Localization>,
    pub age_rating: Option<Resource>,
    pub review_detail: Option<Resource>,
    pub build: Option<Resource>,
    pub price_schedule: Option<Resource>,
    pub availability: Option<Resource>,
    pub screenshot_sets: Vec<ScreenshotSet>,
}

/// Everything a TestFlight check needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestFlightGraph {
    pub app_id: String,
    pub build_id: String,
    pub build: Option<Resource>,
    pub build_app_id: Option<String>,
    pub beta_review_detail: Option<Resource>,
    pub build_localizations: Vec<Localization>,
}

/// Turns a 404 into `None`.
async fn optional(client: &AscClient, path: String) -> Result<Option<Resource>, AscError> {
    match client.send(&RequestDescriptor::get(path)).await {
        Ok(doc) => Ok(doc.single().cloned()),
        Err(e) if e.status() == Some(404) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn all(client: &AscClient, path: String) -> Result<Vec<Resource>, AscError> {
    let req = RequestDescriptor::get(path).query("limit", MAX_LIMIT.to_string());
    Ok(Paginator::new(client).paginate_all(&req).await?.into_resources())
}

fn localizations(resources: Vec<Resource>, scope: Scope) -> Vec<Localization> {
    let mut locs: Vec<Localization> = resources
        .into_iter()
        .map(|r| Localization {
            fields: localization_fields(&r, scope),
            locale: r.attr_str("locale").unwrap_or_default().trim().to_string(),
            id: r.id,
        })
        .collect();
    locs.sort_by(|a, b| a.locale.cmp(&b.locale));
    locs
}

/// Fetches the submission graph for one app version.
///
/// Independent resources are fetched concurrently; screenshot sets fan out
/// per version localization.
pub async fn fetch_submission_graph(
    client: &AscClient,
    app_id: &str,
    version_id: &str,
) -> Result<SubmissionGraph, AscError> {
    let app_info_locs = async {
        let info_id = select_app_info(client, app_id).await?;
        all(client, format!("/v1/appInfos/{info_id}/appInfoLocalizations")).await
    };

    let app_req = RequestDescriptor::get(format!("/v1/apps/{app_id}"));
    let version_req = RequestDescriptor::get(format!("/v1/appStoreVersions/{version_id}"));
    let (app, version, version_locs, info_locs, age_rating, review_detail, build, price_schedule, availability) = tokio::try_join!(
        client.send(&app_req),
        client.send(&version_req),
        all(client, format!("/v1/appStoreVersions/{version_id}/appStoreVersionLocalizations")),
        app_info_locs,
        optional(client, format!("/v1/appStoreVersions/{version_id}/ageRatingDeclaration")),
        optional(client, format!("/v1/appStoreVersions/{version_id}/appStoreReviewDetail")),
        optional(client, format!("/v1/appStoreVersions/{version_id}/build")),
        optional(client, format!("/v1/apps/{app_id}/appPriceSchedule")),
        optional(client, format!("/v1/apps/{app_id}/appAvailabilityV2")),
    )?;

    let version_localizations = localizations(version_locs, Scope::Version);
    let screenshot_sets = fetch_screenshot_sets(client, &version_localizations).await?;
    debug!(
        localizations = version_localizations.len(),
        sets = screenshot_sets.len(),
        "fetched submission graph"
    );

    let version = version.single().cloned().unwrap_or_default();
    Ok(SubmissionGraph {
        app_id: app_id.to_string(),
        primary_locale: app.single().and_then(|a| a.attr_str("primaryLocale")).map(String::from),
        version_id: version_id.to_string(),
        version_string: version.attr_str("versionString").unwrap_or_default().to_string(),
        platform: version.attr_str("platform").unwrap_or_default().to_string(),
        version_localizations,
        app_info_localizations: localizations(info_locs, Scope::AppInfo),
        age_rating,
        review_detail,
        build,
        price_schedule,
        availability,
        screenshot_sets,
    })
}

/// Screenshot sets and their screenshots, per localization.
pub async fn fetch_screenshot_sets(
    client: &AscClient,
    locs: &[Localization],
) -> Result<Vec<ScreenshotSet>, AscError> {
    let items: Vec<(String, String)> = locs.iter().map(|l| (l.id.clone(), l.locale.clone())).collect();
    let per_locale = fan_out(items, DEFAULT_CONCURRENCY, |(loc_id, locale)| {
        let client = client.clone();
        async move {
            let sets = all(&client, format!("/v1/appStoreVersionLocalizations/{loc_id}/appScreenshotSets")).await?;
            let mut result = Vec::with_capacity(sets.len());
            for set in sets {
                let shots = all(&client, format!("/v1/appScreenshotSets/{}/appScreenshots", set.id)).await?;
                result.push(ScreenshotSet {
                    display_type: set.attr_str("screenshotDisplayType").unwrap_or_default().to_string(),
                    locale: locale.clone(),
                    screenshots: shots.iter().map(screenshot).collect(),
                    id: set.id,
                });
            }
            Ok(result)
        }
    })
    .await?;
    Ok(per_locale.into_iter().flatten().collect())
}

fn screenshot(resource: &Resource) -> Screenshot {
    let dimension = |name: &str| resource.lookup(&format!("imageAsset.{name}")).and_then(|v| v.as_u64());
    Screenshot {
        id: resource.id.clone(),
        file_name: resource.attr_str("fileName").unwrap_or_default().to_string(),
        width: dimension("width"),
        height: dimension("height"),
    }
}

/// Fetches the TestFlight graph for one build.
pub async fn fetch_testflight_graph(
    client: &AscClient,
    app_id: &str,
    build_id: &str,
) -> Result<TestFlightGraph, AscError> {
    let (build, build_app, beta_review_detail, build_locs) = tokio::try_join!(
        optional(client, format!("/v1/builds/{build_id}")),
        optional(client, format!("/v1/builds/{build_id}/app")),
        optional(client, format!("/v1/apps/{app_id}/betaAppReviewDetail")),
        async {
            match all(client, format!("/v1/builds/{build_id}/betaBuildLocalizations")).await {
                Err(e) if e.status() == Some(404) => Ok(Vec::new()),
                other => other,
            }
        },
    )?;

    let build_localizations = build_locs
        .into_iter()
        .map(|r| {
            let mut fields = FieldMap::new();
            if let Some(text) = r.attr_str("whatsNew").map(str::trim).filter(|t| !t.is_empty()) {
                fields.insert("whatsNew".to_string(), text.to_string());
            }
            Localization {
                locale: r.attr_str("locale").unwrap_or_default().to_string(),
                id: r.id,
                fields,
            }
        })
        .collect();

    Ok(TestFlightGraph {
        app_id: app_id.to_string(),
        build_id: build_id.to_string(),
        build,
        build_app_id: build_app.map(|a| a.id),
        beta_review_detail,
        build_localizations,
    })
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
            .with_retry_policy(crate::api::RetryPolicy::none())
    }

    async fn stub(server: &mut mockito::ServerGuard, path: &str, status: usize, body: &str) {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_fetch_submission_graph() {
        let mut server = mockito::Server::new_async().await;
        let not_found = r#"{"errors":[{"status":"404","code":"NOT_FOUND","detail":"none"}]}"#;
        stub(&mut server, "/v1/apps/app-1", 200, r#"{"data":{"type":"apps","id":"app-1","attributes":{"primaryLocale":"en-US"}}}"#).await;
        stub(&mut server, "/v1/appStoreVersions/ver-1", 200, r#"{"data":{"type":"appStoreVersions","id":"ver-1","attributes":{"versionString":"1.0","platform":"IOS"}}}"#).await;
        stub(&mut server, "/v1/appStoreVersions/ver-1/appStoreVersionLocalizations", 200, r#"{"data":[{"type":"appStoreVersionLocalizations","id":"loc-1","attributes":{"locale":"en-US","description":"Sync"}}]}"#).await;
        stub(&mut server, "/v1/apps/app-1/appInfos", 200, r#"{"data":[{"type":"appInfos","id":"info-1","attributes":{"state":"PREPARE_FOR_SUBMISSION"}}]}"#).await;
        stub(&mut server, "/v1/appInfos/info-1/appInfoLocalizations", 200, r#"{"data":[{"type":"appInfoLocalizations","id":"ail-1","attributes":{"locale":"en-US","name":"Sync"}}]}"#).await;
        stub(&mut server, "/v1/appStoreVersions/ver-1/ageRatingDeclaration", 200, r#"{"data":{"type":"ageRatingDeclarations","id":"age-1"}}"#).await;
        stub(&mut server, "/v1/appStoreVersions/ver-1/appStoreReviewDetail", 404, not_found).await;
        stub(&mut server, "/v1/appStoreVersions/ver-1/build", 200, r#"{"data":null}"#).await;
        stub(&mut server, "/v1/apps/app-1/appPriceSchedule", 200, r#"{"data":{"type":"appPriceSchedules","id":"app-1"}}"#).await;
        stub(&mut server, "/v1/apps/app-1/appAvailabilityV2", 404, not_found).await;
        stub(&mut server, "/v1/appStoreVersionLocalizations/loc-1/appScreenshotSets", 200, r#"{"data":[{"type":"appScreenshotSets","id":"set-1","attributes":{"screenshotDisplayType":"APP_IPHONE_65"}}]}"#).await;
        stub(&mut server, "/v1/appScreenshotSets/set-1/appScreenshots", 200, r#"{"data":[{"type":"appScreenshots","id":"shot-1","attributes":{"fileName":"a.png","imageAsset":{"width":1242,"height":2688}}}]}"#).await;

        let graph = fetch_submission_graph(&client(&server), "app-1", "ver-1").await.unwrap();
        assert_eq!(graph.primary_locale.as_deref(), Some("en-US"));
        assert_eq!(graph.version_string, "1.0");
        assert_eq!(graph.platform, "IOS");
        assert_eq!(graph.version_localizations[0].fields["description"], "Sync");
        assert_eq!(graph.app_info_localizations[0].fields["name"], "Sync");
        assert!(graph.age_rating.is_some());
        assert!(graph.review_detail.is_none());
        assert!(graph.build.is_none());
        assert!(graph.availability.is_none());
        assert_eq!(graph.screenshot_sets.len(), 1);
        assert_eq!(graph.screenshot_sets[0].locale, "en-US");
        assert_eq!(graph.screenshot_sets[0].screenshots[0].width, Some(1242));
    }

    #[tokio::test]
    async fn test_fetch_testflight_graph() {
        let mut server = mockito::Server::new_async().await;
        stub(&mut server, "/v1/builds/b-1", 200, r#"{"data":{"type":"builds","id":"b-1","attributes":{"processingState":"VALID"}}}"#).await;
        stub(&mut server, "/v1/builds/b-1/app", 200, r#"{"data":{"type":"apps","id":"app-2"}}"#).await;
        stub(&mut server, "/v1/apps/app-1/betaAppReviewDetail", 200, r#"{"data":{"type":"betaAppReviewDetails","id":"app-1","attributes":{"contactEmail":"a@b.c"}}}"#).await;
        stub(&mut server, "/v1/builds/b-1/betaBuildLocalizations", 200, r#"{"data":[{"type":"betaBuildLocalizations","id":"bl-1","attributes":{"locale":"en-US","whatsNew":"  "}}]}"#).await;

        let graph = fetch_testflight_graph(&client(&server), "app-1", "b-1").await.unwrap();
        assert_eq!(graph.build_app_id.as_deref(), Some("app-2"));
        assert!(graph.beta_review_detail.is_some());
        assert_eq!(graph.build_localizations.len(), 1);
        assert!(graph.build_localizations[0].fields.is_empty());
    }
}
