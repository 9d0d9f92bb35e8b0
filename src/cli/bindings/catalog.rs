//
//  asc-cli
//  cli/bindings/catalog.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! The endpoint catalog.

use reqwest::Method;

use super::{Binding, FlagKind, FlagSpec, ResponseKind, Target};
use crate::output::Column;

const APP: FlagSpec = FlagSpec::path("app", "App ID, bundle ID or exact name (env: ASC_APP_ID)").kind(FlagKind::App);

const APP_FILTER: FlagSpec =
    FlagSpec::query("app", "filter[app]", "Filter by app ID, bundle ID or exact name (env: ASC_APP_ID)")
        .kind(FlagKind::App);

const APP_COLUMNS: &[Column] = &[
    Column::new("ID", "id"),
    Column::new("Name", "name"),
    Column::new("Bundle ID", "bundleId"),
    Column::new("SKU", "sku"),
    Column::new("Primary Locale", "primaryLocale"),
];

const BUILD_COLUMNS: &[Column] = &[
    Column::new("ID", "id"),
    Column::new("Build", "version"),
    Column::new("State", "processingState"),
    Column::new("Uploaded", "uploadedDate"),
    Column::new("Expired", "expired"),
];

const VERSION_COLUMNS: &[Column] = &[
    Column::new("ID", "id"),
    Column::new("Version", "versionString"),
    Column::new("Platform", "platform"),
    Column::new("State", "appStoreState"),
    Column::new("Created", "createdDate"),
];

const BETA_GROUP_COLUMNS: &[Column] = &[
    Column::new("ID", "id"),
    Column::new("Name", "name"),
    Column::new("Internal", "isInternalGroup"),
    Column::new("Public Link", "publicLink"),
];

pub static CATALOG: &[Binding] = &[
    Binding {
        group: &["apps"],
        leaf: "list",
        about: "List apps",
        method: Method::GET,
        path: "/v1/apps",
        resource_type: None,
        flags: &[
            FlagSpec::query("bundle-id", "filter[bundleId]", "Filter by bundle ID (comma-separated)").kind(FlagKind::Csv),
            FlagSpec::query("name", "filter[name]", "Filter by app name"),
            FlagSpec::query("sku", "filter[sku]", "Filter by SKU"),
            FlagSpec::query("sort", "sort", "Sort field, e.g. name or -bundleId"),
        ],
        list: true,
        columns: APP_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["apps"],
        leaf: "get",
        about: "Show one app",
        method: Method::GET,
        path: "/v1/apps/{app}",
        resource_type: None,
        flags: &[APP],
        list: false,
        columns: APP_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["builds"],
        leaf: "list",
        about: "List builds",
        method: Method::GET,
        path: "/v1/builds",
        resource_type: None,
        flags: &[
            APP_FILTER,
            FlagSpec::query("build-number", "filter[version]", "Filter by build number"),
            FlagSpec::query("version", "filter[preReleaseVersion.version]", "Filter by marketing version"),
            FlagSpec::query("platform", "filter[preReleaseVersion.platform]", "Filter by platform")
                .kind(FlagKind::Platform),
            FlagSpec::query("processing-state", "filter[processingState]", "Filter by processing state (comma-separated)")
                .kind(FlagKind::Csv),
            FlagSpec::query("sort", "sort", "Sort field").default_value("-uploadedDate"),
        ],
        list: true,
        columns: BUILD_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["builds"],
        leaf: "get",
        about: "Show one build",
        method: Method::GET,
        path: "/v1/builds/{build-id}",
        resource_type: None,
        flags: &[FlagSpec::path("build-id", "Build ID")],
        list: false,
        columns: BUILD_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["versions"],
        leaf: "list",
        about: "List App Store versions of an app",
        method: Method::GET,
        path: "/v1/apps/{app}/appStoreVersions",
        resource_type: None,
        flags: &[
            APP,
            FlagSpec::query("version", "filter[versionString]", "Filter by version string"),
            FlagSpec::query("platform", "filter[platform]", "Filter by platform").kind(FlagKind::Platform),
            FlagSpec::query("state", "filter[appStoreState]", "Filter by App Store state (comma-separated)")
                .kind(FlagKind::Csv),
        ],
        list: true,
        columns: VERSION_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["versions"],
        leaf: "get",
        about: "Show one App Store version",
        method: Method::GET,
        path: "/v1/appStoreVersions/{version-id}",
        resource_type: None,
        flags: &[FlagSpec::path("version-id", "App Store version ID")],
        list: false,
        columns: VERSION_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["app-infos"],
        leaf: "list",
        about: "List app infos of an app",
        method: Method::GET,
        path: "/v1/apps/{app}/appInfos",
        resource_type: None,
        flags: &[APP],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("State", "state"),
            Column::new("Age Rating", "appStoreAgeRating"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["beta-groups"],
        leaf: "list",
        about: "List TestFlight beta groups",
        method: Method::GET,
        path: "/v1/betaGroups",
        resource_type: None,
        flags: &[
            APP_FILTER,
            FlagSpec::query("name", "filter[name]", "Filter by group name"),
            FlagSpec::query("internal", "filter[isInternalGroup]", "Only internal groups").kind(FlagKind::Switch),
        ],
        list: true,
        columns: BETA_GROUP_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["beta-groups"],
        leaf: "get",
        about: "Show one beta group",
        method: Method::GET,
        path: "/v1/betaGroups/{group-id}",
        resource_type: None,
        flags: &[FlagSpec::path("group-id", "Beta group ID")],
        list: false,
        columns: BETA_GROUP_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["beta-groups"],
        leaf: "create",
        about: "Create a beta group",
        method: Method::POST,
        path: "/v1/betaGroups",
        resource_type: Some("betaGroups"),
        flags: &[
            FlagSpec::new("app", "App ID, bundle ID or exact name (env: ASC_APP_ID)", Target::Relationship("app", "apps"))
                .kind(FlagKind::App)
                .required(),
            FlagSpec::new("name", "Group name", Target::Attribute("name")).required(),
            FlagSpec::new("public-link-enabled", "Enable the public link", Target::Attribute("publicLinkEnabled"))
                .kind(FlagKind::Switch),
            FlagSpec::new("public-link-limit", "Maximum testers joining via the public link", Target::Attribute("publicLinkLimit"))
                .kind(FlagKind::Number),
        ],
        list: false,
        columns: BETA_GROUP_COLUMNS,
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["beta-testers"],
        leaf: "list",
        about: "List TestFlight beta testers",
        method: Method::GET,
        path: "/v1/betaTesters",
        resource_type: None,
        flags: &[
            FlagSpec::query("app", "filter[apps]", "Filter by app ID, bundle ID or exact name (env: ASC_APP_ID)")
                .kind(FlagKind::App),
            FlagSpec::query("group-id", "filter[betaGroups]", "Filter by beta group ID"),
            FlagSpec::query("email", "filter[email]", "Filter by email"),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Email", "email"),
            Column::new("First Name", "firstName"),
            Column::new("Last Name", "lastName"),
            Column::new("Invite", "inviteType"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["reviews"],
        leaf: "list",
        about: "List customer reviews of an app",
        method: Method::GET,
        path: "/v1/apps/{app}/customerReviews",
        resource_type: None,
        flags: &[
            APP,
            FlagSpec::query("rating", "filter[rating]", "Filter by star rating (1-5)").kind(FlagKind::Number),
            FlagSpec::query("territory", "filter[territory]", "Filter by territory code, e.g. USA"),
            FlagSpec::query("sort", "sort", "Sort field").default_value("-createdDate"),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Rating", "rating"),
            Column::new("Title", "title"),
            Column::new("Reviewer", "reviewerNickname"),
            Column::new("Territory", "territory"),
            Column::new("Created", "createdDate"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["bundle-ids"],
        leaf: "list",
        about: "List bundle identifiers",
        method: Method::GET,
        path: "/v1/bundleIds",
        resource_type: None,
        flags: &[
            FlagSpec::query("identifier", "filter[identifier]", "Filter by identifier (comma-separated)")
                .kind(FlagKind::Csv),
            FlagSpec::query("platform", "filter[platform]", "Filter by platform").kind(FlagKind::Platform),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Identifier", "identifier"),
            Column::new("Name", "name"),
            Column::new("Platform", "platform"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["subscriptions"],
        leaf: "list",
        about: "List subscriptions in a subscription group",
        method: Method::GET,
        path: "/v1/subscriptionGroups/{group-id}/subscriptions",
        resource_type: None,
        flags: &[FlagSpec::path("group-id", "Subscription group ID")],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Product ID", "productId"),
            Column::new("Period", "subscriptionPeriod"),
            Column::new("State", "state"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["subscriptions", "price-points"],
        leaf: "list",
        about: "List price points of a subscription",
        method: Method::GET,
        path: "/v1/subscriptions/{subscription-id}/pricePoints",
        resource_type: None,
        flags: &[
            FlagSpec::path("subscription-id", "Subscription ID"),
            FlagSpec::query("territory", "filter[territory]", "Filter by territory code (comma-separated)")
                .kind(FlagKind::Csv),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Customer Price", "customerPrice"),
            Column::new("Proceeds", "proceeds"),
            Column::new("Proceeds Year 2", "proceedsYear2"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["iap"],
        leaf: "list",
        about: "List in-app purchases of an app",
        method: Method::GET,
        path: "/v1/apps/{app}/inAppPurchasesV2",
        resource_type: None,
        flags: &[
            APP,
            FlagSpec::query("type", "filter[inAppPurchaseType]", "Filter by type (comma-separated)").kind(FlagKind::Csv),
            FlagSpec::query("state", "filter[state]", "Filter by state (comma-separated)").kind(FlagKind::Csv),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Product ID", "productId"),
            Column::new("Type", "inAppPurchaseType"),
            Column::new("State", "state"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["users"],
        leaf: "list",
        about: "List team users",
        method: Method::GET,
        path: "/v1/users",
        resource_type: None,
        flags: &[
            FlagSpec::query("email", "filter[username]", "Filter by Apple ID email"),
            FlagSpec::query("roles", "filter[roles]", "Filter by role (comma-separated)").kind(FlagKind::Csv),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Username", "username"),
            Column::new("First Name", "firstName"),
            Column::new("Last Name", "lastName"),
            Column::new("Roles", "roles"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["certificates"],
        leaf: "list",
        about: "List signing certificates",
        method: Method::GET,
        path: "/v1/certificates",
        resource_type: None,
        flags: &[FlagSpec::query("type", "filter[certificateType]", "Filter by certificate type (comma-separated)")
            .kind(FlagKind::Csv)],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Type", "certificateType"),
            Column::new("Serial", "serialNumber"),
            Column::new("Expires", "expirationDate"),
        ],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["screenshots"],
        leaf: "sets",
        about: "List screenshot sets of a version localization",
        method: Method::GET,
        path: "/v1/appStoreVersionLocalizations/{localization-id}/appScreenshotSets",
        resource_type: None,
        flags: &[FlagSpec::path("localization-id", "App Store version localization ID")],
        list: true,
        columns: &[Column::new("ID", "id"), Column::new("Display Type", "screenshotDisplayType")],
        response: ResponseKind::Document,
        experimental: false,
    },
    Binding {
        group: &["screenshots"],
        leaf: "download",
        about: "Download a screenshot image",
        method: Method::GET,
        path: "/v1/appScreenshots/{id}",
        resource_type: None,
        flags: &[
            FlagSpec::path("id", "Screenshot ID"),
            FlagSpec::new("output-dir", "Directory to save the image in", Target::Local).default_value("."),
        ],
        list: false,
        columns: &[],
        response: ResponseKind::Asset,
        experimental: false,
    },
    Binding {
        group: &["analytics"],
        leaf: "sales",
        about: "Download a sales report",
        method: Method::GET,
        path: "/v1/salesReports",
        resource_type: None,
        flags: &[
            FlagSpec::query("vendor", "filter[vendorNumber]", "Vendor number (env: ASC_VENDOR_NUMBER)")
                .kind(FlagKind::Vendor)
                .required(),
            FlagSpec::query("type", "filter[reportType]", "Report type").default_value("SALES"),
            FlagSpec::query("subtype", "filter[reportSubType]", "Report subtype").default_value("SUMMARY"),
            FlagSpec::query("frequency", "filter[frequency]", "DAILY, WEEKLY, MONTHLY or YEARLY").default_value("DAILY"),
            FlagSpec::query("date", "filter[reportDate]", "Report date, e.g. 2026-01-31"),
            FlagSpec::query("version", "filter[version]", "Report format version").default_value("1_0"),
        ],
        list: false,
        columns: &[],
        response: ResponseKind::Report,
        experimental: false,
    },
    Binding {
        group: &["nominations"],
        leaf: "list",
        about: "List featuring nominations",
        method: Method::GET,
        path: "/v1/nominations",
        resource_type: None,
        flags: &[
            FlagSpec::query("type", "filter[type]", "Filter by nomination type (comma-separated)").kind(FlagKind::Csv),
            FlagSpec::query("state", "filter[state]", "Filter by state (comma-separated)").kind(FlagKind::Csv),
        ],
        list: true,
        columns: &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("State", "state"),
            Column::new("Publish Start", "publishStartDate"),
        ],
        response: ResponseKind::Document,
        experimental: true,
    },
];
