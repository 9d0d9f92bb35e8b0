//
//  asc-cli
//  error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Error Taxonomy
//!
//! Every fallible operation in the crate returns [`AscError`]. The variants
//! follow the kinds of failure a user needs to tell apart:
//!
//! | Variant | Meaning | Exit code |
//! |---------|---------|-----------|
//! | `Usage` | flag or argument shape violates the command contract | 2 |
//! | `Validation` | well-formed but semantically invalid input | 2 |
//! | `Auth` | token cannot be minted, signed, or was rejected | 1 |
//! | `Transport` | I/O failure, timeout, DNS, TLS | 1 |
//! | `Api` / `Server` / `RateLimited` | structured error from App Store Connect | 1 |
//! | `NotFound` / `Ambiguity` | resolver outcomes | 1 |
//! | `Pagination` | next-URL loop, foreign host, malformed next | 1 |
//! | `Reported` | a validation report contains blocking issues | 64 |
//! | `Cancelled` | deadline or interrupt; wraps the first real failure | 1 |
//!
//! The top-level dispatcher prints `Error: <message>` (and an optional
//! `Hint:` line) to stderr and exits with [`AscError::exit_code`].

use std::time::Duration;

use thiserror::Error;

use crate::api::ApiErrorItem;
use crate::auth::AuthError;
use crate::exit_codes;
use crate::util::truncate;

/// The error type for every layer of the CLI.
#[derive(Debug, Error)]
pub enum AscError {
    /// Flag or argument shape violates the command contract.
    #[error("{0}")]
    Usage(String),

    /// Input is well-formed but semantically invalid (bad locale, out-of-range
    /// limit, mutually exclusive flags).
    #[error("{0}")]
    Validation(String),

    /// Credentials could not be resolved, the key could not be used, or the
    /// API rejected the token.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// I/O failure, timeout, DNS or TLS error.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// App Store Connect returned a structured error list.
    #[error("{}", describe_api_error(*status, items))]
    Api { status: u16, items: Vec<ApiErrorItem> },

    /// HTTP 429 after retries were exhausted.
    #[error("rate limited by App Store Connect{}", describe_retry_after(retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 5xx after retries were exhausted.
    #[error("{}", describe_api_error(*status, items))]
    Server { status: u16, items: Vec<ApiErrorItem> },

    /// A resolver lookup found nothing.
    #[error("{0}")]
    NotFound(String),

    /// A resolver lookup found more than one candidate.
    #[error("{0}")]
    Ambiguity(String),

    /// The pagination chain was unsafe to follow.
    #[error("{0}")]
    Pagination(String),

    /// A report with blocking issues was already rendered to stdout.
    #[error("{message}")]
    Reported { message: String },

    /// The invocation deadline expired or the operator interrupted the run.
    #[error("{cause}")]
    Cancelled {
        #[source]
        cause: Box<AscError>,
    },

    /// A reconciliation operation failed; earlier operations stay applied.
    #[error("{key}: {source}")]
    Apply {
        key: String,
        #[source]
        source: Box<AscError>,
    },

    /// Configuration file could not be read or written.
    #[error("{0}")]
    Config(String),

    /// A response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A worker task failed outside of the API call itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AscError {
    /// Builds a [`AscError::Usage`] from anything printable.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Builds a [`AscError::Validation`] from anything printable.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wraps a reqwest failure as a transport error.
    pub fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            format!("request failed: {err}")
        };
        Self::Transport {
            message,
            source: Some(err),
        }
    }

    /// A transport error for a request that ran past its time budget.
    pub fn timeout(budget: Duration) -> Self {
        Self::Transport {
            message: format!("request timed out after {}", crate::util::format_duration(budget)),
            source: None,
        }
    }

    /// The error surfaced when the operator interrupts the run.
    pub fn interrupted() -> Self {
        Self::Cancelled {
            cause: Box::new(Self::Transport {
                message: "interrupted".to_string(),
                source: None,
            }),
        }
    }

    /// Maps the error kind onto the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Validation(_) => exit_codes::USAGE,
            Self::Reported { .. } => exit_codes::REPORTED,
            Self::Apply { source, .. } if source.is_usage() => exit_codes::USAGE,
            _ => exit_codes::ERROR,
        }
    }

    /// True for errors that should print usage and exit with the usage code.
    pub fn is_usage(&self) -> bool {
        self.exit_code() == exit_codes::USAGE
    }

    /// HTTP status carried by API-level errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// An optional remediation line printed after the error.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Auth(AuthError::MissingCredentials(_)) => Some(
                "set ASC_KEY_ID, ASC_ISSUER_ID and ASC_PRIVATE_KEY_PATH (or ASC_PRIVATE_KEY / ASC_PRIVATE_KEY_B64)"
                    .to_string(),
            ),
            Self::Auth(AuthError::Rejected(_)) | Self::Api { status: 401, .. } => Some(
                "check that the API key is active and that the issuer ID belongs to the same team"
                    .to_string(),
            ),
            Self::Api { status: 403, .. } => {
                Some("the API key role may not have access to this resource".to_string())
            }
            Self::Transport { message, .. } if message.contains("timed out") => {
                Some("increase the deadline, e.g. ASC_TIMEOUT=90s".to_string())
            }
            Self::Cancelled { cause } => cause.hint(),
            Self::Apply { source, .. } => source.hint(),
            _ => None,
        }
    }
}

fn describe_api_error(status: u16, items: &[ApiErrorItem]) -> String {
    let details: Vec<String> = items
        .iter()
        .map(|item| {
            let mut line = match (item.title.as_deref(), item.detail.as_deref()) {
                (Some(title), Some(detail)) if title != detail => format!("{title}: {detail}"),
                (_, Some(detail)) => detail.to_string(),
                (Some(title), None) => title.to_string(),
                (None, None) => item.code.clone().unwrap_or_default(),
            };
            if let Some(pointer) = item.source.as_ref().and_then(|s| s.pointer.as_deref()) {
                line.push_str(&format!(" ({pointer})"));
            }
            line
        })
        .filter(|line| !line.is_empty())
        .collect();

    if details.is_empty() {
        format!("App Store Connect API error ({status})")
    } else {
        format!(
            "App Store Connect API error ({status}): {}",
            truncate(&details.join("; "), 600)
        )
    }
}

fn describe_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

impl From<anyhow::Error> for AscError {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorSource;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AscError::usage("bad").exit_code(), 2);
        assert_eq!(AscError::validation("bad").exit_code(), 2);
        assert_eq!(AscError::NotFound("x".into()).exit_code(), 1);
        assert_eq!(
            AscError::Reported {
                message: "validate: found 1 blocking issue(s)".into()
            }
            .exit_code(),
            64
        );
        assert_eq!(AscError::interrupted().exit_code(), 1);
    }

    #[test]
    fn test_api_error_message_keeps_pointer() {
        let err = AscError::Api {
            status: 409,
            items: vec![ApiErrorItem {
                code: Some("ENTITY_ERROR.ATTRIBUTE.INVALID".into()),
                title: Some("An attribute value is invalid.".into()),
                detail: Some("The keywords are too long.".into()),
                source: Some(ErrorSource {
                    pointer: Some("/data/attributes/keywords".into()),
                    parameter: None,
                }),
                ..Default::default()
            }],
        };
        let message = err.to_string();
        assert!(message.contains("(409)"));
        assert!(message.contains("The keywords are too long."));
        assert!(message.contains("/data/attributes/keywords"));
    }

    #[test]
    fn test_cancelled_preserves_cause() {
        let err = AscError::Cancelled {
            cause: Box::new(AscError::timeout(Duration::from_secs(30))),
        };
        assert_eq!(err.to_string(), "request timed out after 30s");
        assert!(err.hint().unwrap().contains("ASC_TIMEOUT"));
    }

    #[test]
    fn test_apply_wraps_key() {
        let err = AscError::Apply {
            key: "version:1.2:en-US:description".into(),
            source: Box::new(AscError::NotFound("gone".into())),
        };
        assert_eq!(err.to_string(), "version:1.2:en-US:description: gone");
        assert_eq!(err.exit_code(), 1);
    }
}
