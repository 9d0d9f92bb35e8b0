//
//  asc-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! App Store Connect authenticates every call with a short-lived ES256 JWT
//! signed by a team API key. This module turns the key material into bearer
//! tokens:
//!
//! - [`credentials`]: resolves the key ID, issuer ID and private key from
//!   `ASC_*` environment variables or the config file
//! - [`token`]: mints, caches and rotates the JWTs
//!
//! The transport only ever sees the [`TokenProvider`] trait. The token
//! manager knows nothing about HTTP, which keeps it testable with a frozen
//! clock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use asc_cli::auth::{resolve_credentials, TokenManager, TokenProvider};
//! use asc_cli::config::AuthConfig;
//!
//! # async fn demo() -> Result<(), asc_cli::auth::AuthError> {
//! let credentials = resolve_credentials(
//!     |name| std::env::var(name).ok(),
//!     &AuthConfig::default(),
//!     false,
//! )?;
//! let tokens = TokenManager::new(&credentials)?;
//! let bearer = tokens.token().await?;
//! # let _ = bearer;
//! # Ok(())
//! # }
//! ```

mod credentials;
mod token;

pub use credentials::*;
pub use token::*;

use thiserror::Error;

/// Failures while producing or using an API token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more of key ID, issuer ID or private key could not be resolved.
    #[error("missing App Store Connect credentials: {0}")]
    MissingCredentials(String),

    /// Credentials resolved but the configuration is unusable (unreadable key
    /// file, mixed sources under `--strict-auth`).
    #[error("{0}")]
    Config(String),

    /// The private key is not a PKCS#8 P-256 key.
    #[error("invalid private key: {0}")]
    Key(String),

    /// Signing the token failed.
    #[error("failed to sign API token: {0}")]
    Sign(String),

    /// App Store Connect kept answering 401 after a token refresh.
    #[error("App Store Connect rejected the API token: {0}")]
    Rejected(String),
}
