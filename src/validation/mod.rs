//
//  asc-cli
//  validation/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Validation Module
//!
//! Submission-readiness checks. A resource graph is fetched once
//! ([`graph`]), every rule in [`rules`] turns it into check records, and the
//! records are folded into a [`Report`]. The engine knows nothing about the
//! individual rules: it only counts severities and decides what blocks.

pub mod graph;

pub mod rules;

use serde::Serialize;

use crate::error::AscError;
use crate::output::TableOutput;

pub use graph::{fetch_submission_graph, fetch_testflight_graph, SubmissionGraph, TestFlightGraph};
pub use rules::{evaluate_submission, evaluate_testflight};

/// How serious a check result is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// One failed (or informational) check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: String,
    pub severity: Severity,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl CheckResult {
    /// A check whose scope is the first segment of its id.
    pub fn new(id: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            severity,
            scope: id.split('.').next().unwrap_or(id).to_string(),
            locale: None,
            field: None,
            resource_type: None,
            resource_id: None,
            message: message.into(),
            remediation: None,
        }
    }

    pub fn error(id: &str, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Error, message)
    }

    pub fn warning(id: &str, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Warning, message)
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn resource(mut self, kind: &str, id: &str) -> Self {
        self.resource_type = Some(kind.to_string());
        if !id.is_empty() {
            self.resource_id = Some(id.to_string());
        }
        self
    }

    pub fn remediation(mut self, text: impl Into<String>) -> Self {
        self.remediation = Some(text.into());
        self
    }
}

/// Severity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub blocking: usize,
}

impl Summary {
    /// Counts `checks`. Errors always block; warnings block only when strict.
    pub fn of(checks: &[CheckResult], strict: bool) -> Self {
        let mut summary = Self::default();
        for check in checks {
            match check.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary.blocking = summary.errors + if strict { summary.warnings } else { 0 };
        summary
    }
}

/// The result of a validation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    pub summary: Summary,
    pub checks: Vec<CheckResult>,
    pub strict: bool,
}

impl Report {
    /// Builds a report for an app, ordering checks by severity then id.
    pub fn new(app_id: impl Into<String>, mut checks: Vec<CheckResult>, strict: bool) -> Self {
        checks.sort_by(|a, b| {
            (a.severity, &a.id, &a.locale, &a.resource_id).cmp(&(b.severity, &b.id, &b.locale, &b.resource_id))
        });
        Self {
            app_id: app_id.into(),
            version_id: None,
            version_string: None,
            platform: None,
            build_id: None,
            summary: Summary::of(&checks, strict),
            checks,
            strict,
        }
    }

    /// The error that fails the command once the report has been rendered.
    pub fn blocking_error(&self) -> Option<AscError> {
        (self.summary.blocking > 0).then(|| AscError::Reported {
            message: format!("validate: found {} blocking issue(s)", self.summary.blocking),
        })
    }
}

impl TableOutput for Report {
    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("App ID".to_string(), self.app_id.clone())];
        if let Some(version) = self.version_string.as_ref().or(self.version_id.as_ref()) {
            fields.push(("Version".to_string(), version.clone()));
        }
        if let Some(platform) = &self.platform {
            fields.push(("Platform".to_string(), platform.clone()));
        }
        if let Some(build) = &self.build_id {
            fields.push(("Build ID".to_string(), build.clone()));
        }
        fields.push(("Errors".to_string(), self.summary.errors.to_string()));
        fields.push(("Warnings".to_string(), self.summary.warnings.to_string()));
        fields.push(("Blocking".to_string(), self.summary.blocking.to_string()));
        fields
    }

    fn headers(&self) -> Vec<String> {
        ["severity", "id", "locale", "field", "message"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.checks
            .iter()
            .map(|c| {
                vec![
                    c.severity.as_str().to_string(),
                    c.id.clone(),
                    c.locale.clone().unwrap_or_default(),
                    c.field.clone().unwrap_or_default(),
                    c.message.clone(),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CheckResult> {
        vec![
            CheckResult::warning("pricing.schedule.missing", "no price schedule"),
            CheckResult::error("metadata.required.description", "description is required").locale("en-US"),
            CheckResult::new("build.info", Severity::Info, "note"),
        ]
    }

    #[test]
    fn test_summary_counts_and_blocking() {
        let lenient = Summary::of(&sample(), false);
        assert_eq!((lenient.errors, lenient.warnings, lenient.infos, lenient.blocking), (1, 1, 1, 1));

        let strict = Summary::of(&sample(), true);
        assert_eq!(strict.blocking, 2);
    }

    #[test]
    fn test_warnings_only_pass_unless_strict() {
        let checks = vec![CheckResult::warning("pricing.schedule.missing", "no price schedule")];
        assert!(Report::new("app-1", checks.clone(), false).blocking_error().is_none());

        let err = Report::new("app-1", checks, true).blocking_error().unwrap();
        assert_eq!(err.exit_code(), 64);
        assert_eq!(err.to_string(), "validate: found 1 blocking issue(s)");
    }

    #[test]
    fn test_report_orders_errors_first_and_derives_scope() {
        let report = Report::new("app-1", sample(), false);
        assert_eq!(report.checks[0].id, "metadata.required.description");
        assert_eq!(report.checks[0].scope, "metadata");
        assert_eq!(report.checks[2].severity, Severity::Info);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["checks"][0]["severity"], "error");
        assert_eq!(json["checks"][0]["locale"], "en-US");
        assert!(json.get("versionId").is_none());
        assert!(json["checks"][1].get("locale").is_none());
    }
}
