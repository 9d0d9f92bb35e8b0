//
//  asc-cli
//  validation/rules.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Submission and TestFlight rules.
//!
//! Every rule is a plain function from a graph to check records; the engine
//! in [`super`] only counts them.

use crate::api::Resource;

use super::graph::{Localization, ScreenshotSet, SubmissionGraph, TestFlightGraph};
use super::CheckResult;

/// Processing state a build must reach before it can be submitted.
pub const VALID_BUILD_STATE: &str = "VALID";

/// Maximum characters per field.
pub const LENGTH_LIMITS: &[(&str, usize)] = &[
    ("name", 30),
    ("subtitle", 30),
    ("keywords", 100),
    ("promotionalText", 170),
    ("description", 4000),
    ("whatsNew", 4000),
];

/// Accepted pixel sizes per display type, portrait. Landscape is the swap.
const DISPLAY_TYPES: &[(&str, &str, &[(u64, u64)])] = &[
    ("APP_IPHONE_67", "IOS", &[(1290, 2796), (1260, 2736), (1320, 2868)]),
    ("APP_IPHONE_65", "IOS", &[(1242, 2688), (1284, 2778)]),
    ("APP_IPHONE_61", "IOS", &[(1179, 2556), (1206, 2622)]),
    ("APP_IPHONE_58", "IOS", &[(1125, 2436), (1170, 2532), (1080, 2340)]),
    ("APP_IPHONE_55", "IOS", &[(1242, 2208)]),
    ("APP_IPHONE_47", "IOS", &[(750, 1334)]),
    ("APP_IPAD_PRO_3GEN_129", "IOS", &[(2048, 2732), (2064, 2752)]),
    ("APP_IPAD_PRO_129", "IOS", &[(2048, 2732)]),
    ("APP_IPAD_PRO_3GEN_11", "IOS", &[(1668, 2388), (1640, 2360), (1488, 2266)]),
    ("APP_IPAD_105", "IOS", &[(1668, 2224)]),
    ("APP_IPAD_97", "IOS", &[(1536, 2048)]),
    ("APP_WATCH_ULTRA", "IOS", &[(410, 502), (422, 514)]),
    ("APP_WATCH_SERIES_10", "IOS", &[(416, 496)]),
    ("APP_WATCH_SERIES_7", "IOS", &[(396, 484)]),
    ("APP_DESKTOP", "MAC_OS", &[(1280, 800), (1440, 900), (2560, 1600), (2880, 1800)]),
    ("APP_APPLE_TV", "TV_OS", &[(1920, 1080), (3840, 2160)]),
    ("APP_APPLE_VISION_PRO", "VISION_OS", &[(3840, 2160)]),
];

/// Runs every submission rule.
pub fn evaluate_submission(graph: &SubmissionGraph) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    checks.extend(required_field_checks(graph));
    checks.extend(length_checks(&graph.version_localizations, "appStoreVersionLocalizations"));
    checks.extend(length_checks(&graph.app_info_localizations, "appInfoLocalizations"));
    checks.extend(review_detail_checks(graph.review_detail.as_ref()));
    checks.extend(age_rating_checks(graph.age_rating.as_ref()));
    checks.extend(screenshot_checks(graph));
    checks.extend(build_checks(graph.build.as_ref()));
    checks.extend(commerce_checks(graph));
    checks
}

/// Runs every TestFlight rule.
pub fn evaluate_testflight(graph: &TestFlightGraph) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    match &graph.build {
        None => checks.push(
            CheckResult::error("testflight.build.missing", format!("build {} not found", graph.build_id))
                .resource("builds", &graph.build_id),
        ),
        Some(build) => {
            if let Some(owner) = graph.build_app_id.as_deref().filter(|owner| *owner != graph.app_id) {
                checks.push(
                    CheckResult::error(
                        "testflight.build.app_mismatch",
                        format!("build {} belongs to app {owner}, not {}", build.id, graph.app_id),
                    )
                    .resource("builds", &build.id),
                );
            }
            checks.extend(build_state_checks("testflight.build", build));
        }
    }

    match &graph.beta_review_detail {
        None => checks.push(
            CheckResult::error("testflight.review_details.missing", "beta app review details are missing")
                .resource("betaAppReviewDetails", &graph.app_id)
                .remediation("add contact details under TestFlight > Test Information"),
        ),
        Some(detail) => {
            for field in ["contactEmail", "contactFirstName", "contactLastName", "contactPhone"] {
                if blank(detail.attr_str(field)) {
                    checks.push(
                        CheckResult::error(
                            "testflight.review_details.missing_field",
                            format!("beta app review {field} is required"),
                        )
                        .field(field)
                        .resource("betaAppReviewDetails", &detail.id),
                    );
                }
            }
        }
    }

    let has_notes = graph.build_localizations.iter().any(|l| l.fields.contains_key("whatsNew"));
    if graph.build.is_some() && !has_notes {
        checks.push(
            CheckResult::warning("testflight.whats_new.missing", "no beta build localization has What to Test notes")
                .field("whatsNew")
                .resource("builds", &graph.build_id),
        );
    }

    checks
}

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// `1.0`, `1.0.0`, `1.0.0.0`: no What's New required.
pub fn is_initial_release(version: &str) -> bool {
    let mut parts = version.trim().split('.');
    let major = parts.next();
    let rest: Vec<&str> = parts.collect();
    major.and_then(|m| m.parse::<u64>().ok()) == Some(1)
        && !rest.is_empty()
        && rest.iter().all(|p| p.parse::<u64>().ok() == Some(0))
}

/// Required version and app-info fields.
pub fn required_field_checks(graph: &SubmissionGraph) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    let version_kind = "appStoreVersionLocalizations";
    let info_kind = "appInfoLocalizations";

    if graph.version_localizations.is_empty() {
        checks.push(
            CheckResult::error("metadata.required.localizations", "version has no localizations")
                .resource("appStoreVersions", &graph.version_id),
        );
    }
    if let Some(primary) = graph.primary_locale.as_deref() {
        if !graph.version_localizations.is_empty() && !graph.version_localizations.iter().any(|l| l.locale == primary)
        {
            checks.push(
                CheckResult::error(
                    "metadata.required.primary_locale",
                    format!("version localization for primary locale {primary} is missing"),
                )
                .locale(primary)
                .resource("appStoreVersions", &graph.version_id),
            );
        }
        if !graph.app_info_localizations.is_empty() && !graph.app_info_localizations.iter().any(|l| l.locale == primary)
        {
            checks.push(
                CheckResult::error(
                    "metadata.required.primary_locale",
                    format!("app info localization for primary locale {primary} is missing"),
                )
                .locale(primary)
                .resource("appInfos", ""),
            );
        }
    }

    let initial = is_initial_release(&graph.version_string);
    for loc in &graph.version_localizations {
        for (field, id) in [
            ("description", "metadata.required.description"),
            ("keywords", "metadata.required.keywords"),
            ("supportUrl", "metadata.required.support_url"),
        ] {
            if !loc.fields.contains_key(field) {
                checks.push(
                    CheckResult::error(id, format!("{field} is required"))
                        .locale(&loc.locale)
                        .field(field)
                        .resource(version_kind, &loc.id),
                );
            }
        }
        if !initial && !loc.fields.contains_key("whatsNew") {
            checks.push(
                CheckResult::warning("metadata.required.whats_new", "whatsNew is recommended for updates")
                    .locale(&loc.locale)
                    .field("whatsNew")
                    .resource(version_kind, &loc.id),
            );
        }
    }

    if graph.app_info_localizations.is_empty() {
        checks.push(CheckResult::warning(
            "metadata.required.app_info_localizations",
            "app info has no localizations",
        ));
    }
    for loc in &graph.app_info_localizations {
        if !loc.fields.contains_key("name") {
            checks.push(
                CheckResult::error("metadata.required.name", "name is required")
                    .locale(&loc.locale)
                    .field("name")
                    .resource(info_kind, &loc.id),
            );
        }
        if !loc.fields.contains_key("subtitle") {
            checks.push(
                CheckResult::warning("metadata.required.subtitle", "subtitle is recommended")
                    .locale(&loc.locale)
                    .field("subtitle")
                    .resource(info_kind, &loc.id),
            );
        }
    }

    checks
}

/// Character limits, counted in Unicode scalar values.
pub fn length_checks(locs: &[Localization], kind: &str) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    for loc in locs {
        for (field, limit) in LENGTH_LIMITS {
            let Some(value) = loc.fields.get(*field) else { continue };
            let length = value.chars().count();
            if length > *limit {
                checks.push(
                    CheckResult::error(
                        &format!("metadata.length.{field}"),
                        format!("{field} is {length} characters (limit {limit})"),
                    )
                    .locale(&loc.locale)
                    .field(field)
                    .resource(kind, &loc.id),
                );
            }
        }
    }
    checks
}

pub fn review_detail_checks(detail: Option<&Resource>) -> Vec<CheckResult> {
    let Some(detail) = detail else {
        return vec![CheckResult::error("review_details.missing", "App Review contact details are missing")
            .resource("appStoreReviewDetails", "")
            .remediation("add a contact under App Review Information")];
    };

    let mut checks = Vec::new();
    if blank(detail.attr_str("contactEmail")) {
        checks.push(
            CheckResult::error("review_details.missing_field", "App Review contact email is required")
                .field("contactEmail")
                .resource("appStoreReviewDetails", &detail.id),
        );
    }
    for field in ["contactFirstName", "contactLastName", "contactPhone"] {
        if blank(detail.attr_str(field)) {
            checks.push(
                CheckResult::warning("review_details.missing_field", format!("App Review {field} is empty"))
                    .field(field)
                    .resource("appStoreReviewDetails", &detail.id),
            );
        }
    }
    let demo_required = detail
        .attributes
        .get("demoAccountRequired")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if demo_required {
        for field in ["demoAccountName", "demoAccountPassword"] {
            if blank(detail.attr_str(field)) {
                checks.push(
                    CheckResult::error("review_details.demo_account", format!("{field} is required when a demo account is required"))
                        .field(field)
                        .resource("appStoreReviewDetails", &detail.id),
                );
            }
        }
    }
    checks
}

pub fn age_rating_checks(declaration: Option<&Resource>) -> Vec<CheckResult> {
    match declaration {
        Some(_) => Vec::new(),
        None => vec![CheckResult::error("age_rating.missing", "age rating declaration is missing")
            .resource("ageRatingDeclarations", "")
            .remediation("complete the age rating questionnaire")],
    }
}

/// Presence per locale, non-empty sets, and known display-type sizes.
pub fn screenshot_checks(graph: &SubmissionGraph) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    if graph.screenshot_sets.is_empty() {
        checks.push(
            CheckResult::error("screenshots.required.any", "no screenshot sets found for this version")
                .resource("appStoreVersions", &graph.version_id),
        );
        return checks;
    }

    if !graph.screenshot_sets.iter().any(|s| !s.screenshots.is_empty()) {
        checks.push(
            CheckResult::error("screenshots.required.set_nonempty", "every screenshot set is empty")
                .resource("appStoreVersions", &graph.version_id),
        );
    }

    for loc in &graph.version_localizations {
        if !graph.screenshot_sets.iter().any(|s| s.locale == loc.locale) {
            checks.push(
                CheckResult::error(
                    "screenshots.required.localization_missing_sets",
                    format!("locale {} has no screenshot sets", loc.locale),
                )
                .locale(&loc.locale)
                .resource("appStoreVersionLocalizations", &loc.id),
            );
        }
    }

    for set in &graph.screenshot_sets {
        if set.screenshots.is_empty() {
            checks.push(
                CheckResult::error(
                    "screenshots.required.set_nonempty",
                    format!("screenshot set {} is empty", set.display_type),
                )
                .locale(&set.locale)
                .resource("appScreenshotSets", &set.id),
            );
        }
        checks.extend(dimension_checks(&graph.platform, set));
    }

    checks
}

/// Display-type platform and pixel-size checks for one set.
///
/// Unknown display types are skipped. A set for another platform reports
/// the mismatch only.
pub fn dimension_checks(platform: &str, set: &ScreenshotSet) -> Vec<CheckResult> {
    let Some((_, expected_platform, sizes)) = DISPLAY_TYPES.iter().find(|(name, _, _)| *name == set.display_type)
    else {
        return Vec::new();
    };

    if !platform.is_empty() && platform != *expected_platform {
        return vec![CheckResult::error(
            "screenshots.display_type_platform_mismatch",
            format!("{} screenshots are for {expected_platform}, version platform is {platform}", set.display_type),
        )
        .locale(&set.locale)
        .resource("appScreenshotSets", &set.id)];
    }

    let allowed: Vec<String> = sizes.iter().map(|(w, h)| format!("{w}x{h}")).collect();
    set.screenshots
        .iter()
        .filter_map(|shot| {
            let (w, h) = (shot.width?, shot.height?);
            let ok = sizes.iter().any(|&(sw, sh)| (w, h) == (sw, sh) || (w, h) == (sh, sw));
            (!ok).then(|| {
                let name = if shot.file_name.is_empty() { &shot.id } else { &shot.file_name };
                CheckResult::error(
                    "screenshots.dimension_mismatch",
                    format!(
                        "{name} is {w}x{h}; {} accepts {} (either orientation)",
                        set.display_type,
                        allowed.join(", ")
                    ),
                )
                .locale(&set.locale)
                .resource("appScreenshots", &shot.id)
            })
        })
        .collect()
}

pub fn build_checks(build: Option<&Resource>) -> Vec<CheckResult> {
    match build {
        None => vec![CheckResult::error("build.required.missing", "no build is attached to this version")
            .resource("builds", "")
            .remediation("attach a processed build before submitting")],
        Some(build) => build_state_checks("build", build),
    }
}

fn build_state_checks(prefix: &str, build: &Resource) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    let state = build.attr_str("processingState").unwrap_or_default();
    if state != VALID_BUILD_STATE {
        checks.push(
            CheckResult::error(
                &format!("{prefix}.invalid.processing_state"),
                format!("build processing state is {state:?}, expected {VALID_BUILD_STATE}"),
            )
            .field("processingState")
            .resource("builds", &build.id),
        );
    }
    if build.attributes.get("expired").and_then(|v| v.as_bool()) == Some(true) {
        checks.push(
            CheckResult::error(&format!("{prefix}.invalid.expired"), "build has expired")
                .field("expired")
                .resource("builds", &build.id),
        );
    }
    checks
}

/// Pricing and availability are warnings: new apps often set them last.
pub fn commerce_checks(graph: &SubmissionGraph) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    if graph.price_schedule.is_none() {
        checks.push(
            CheckResult::warning("pricing.schedule.missing", "app has no price schedule")
                .resource("appPriceSchedules", &graph.app_id),
        );
    }
    if graph.availability.is_none() {
        checks.push(
            CheckResult::warning("availability.territories.none", "app availability is not configured")
                .resource("appAvailabilities", &graph.app_id),
        );
    }
    checks
}
