//
//  asc-cli
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Authentication commands for the App Store Connect CLI.
//!
//! Credentials are an API key: key ID, issuer ID and a `.p8` private key,
//! read from `ASC_*` environment variables or the config file. These
//! commands only inspect them; nothing is ever stored in a credential vault.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::RequestDescriptor;
use crate::auth::{credential_status, resolve_credentials, CredentialStatus, TokenManager, TokenProvider};
use crate::context::InvocationContext;
use crate::error::AscError;
use crate::output::TableOutput;

/// Inspect API key credentials.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Show which credentials resolve and where they come from
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also call the API to confirm the key is accepted
    #[arg(long)]
    pub verify: bool,
}

/// Result of `auth status`. Never carries a token or key material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(flatten)]
    pub credentials: CredentialStatus,
    pub config_path: Option<String>,
    pub strict_auth: bool,
    /// A token could be minted locally.
    pub token_ok: bool,
    /// The API accepted the token. Present only with `--verify`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableOutput for AuthStatus {
    fn fields(&self) -> Vec<(String, String)> {
        let source = |s: Option<crate::auth::CredentialSource>| s.map(|s| format!(" ({s})")).unwrap_or_default();
        let mut fields = vec![
            (
                "Key ID".to_string(),
                format!("{}{}", self.credentials.key_id.as_deref().unwrap_or("-"), source(self.credentials.key_id_source)),
            ),
            (
                "Issuer ID".to_string(),
                format!(
                    "{}{}",
                    self.credentials.issuer_id.as_deref().unwrap_or("-"),
                    source(self.credentials.issuer_id_source)
                ),
            ),
            (
                "Private Key".to_string(),
                format!(
                    "{}{}",
                    self.credentials.private_key.as_deref().unwrap_or("-"),
                    source(self.credentials.private_key_source)
                ),
            ),
            ("Token".to_string(), if self.token_ok { "ok" } else { "unavailable" }.to_string()),
        ];
        if let Some(verified) = self.verified {
            fields.push(("Verified".to_string(), verified.to_string()));
        }
        if !self.credentials.missing.is_empty() {
            fields.push(("Missing".to_string(), self.credentials.missing.join(", ")));
        }
        if let Some(error) = &self.error {
            fields.push(("Error".to_string(), error.clone()));
        }
        if let Some(path) = &self.config_path {
            fields.push(("Config".to_string(), path.clone()));
        }
        fields
    }

    fn headers(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        Vec::new()
    }
}

impl AuthCommand {
    pub async fn run(&self, ctx: &InvocationContext) -> Result<(), AscError> {
        match &self.command {
            AuthSubcommand::Status(args) => status(ctx, args).await,
        }
    }
}

/// Reports credential state. Fails only when the result cannot be rendered,
/// or when `--verify` was asked for and the API rejected the key.
async fn status(ctx: &InvocationContext, args: &StatusArgs) -> Result<(), AscError> {
    let env = |name: &str| std::env::var(name).ok();
    let writer = ctx.output()?;

    let mut result = AuthStatus {
        credentials: credential_status(&env, &ctx.config.auth),
        config_path: crate::config::Config::config_path()
            .ok()
            .map(|p| p.display().to_string()),
        strict_auth: ctx.settings.strict_auth,
        token_ok: false,
        verified: None,
        error: None,
    };

    let minted = match resolve_credentials(env, &ctx.config.auth, ctx.settings.strict_auth) {
        Ok(credentials) => match TokenManager::new(&credentials) {
            Ok(tokens) => tokens.token().await.map(|_| ()),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    match minted {
        Ok(()) => result.token_ok = true,
        Err(e) => result.error = Some(e.to_string()),
    }

    let mut verify_error = None;
    if args.verify && result.token_ok {
        let probe = RequestDescriptor::get("/v1/apps").query("limit", "1");
        match ctx.client()?.send(&probe).await {
            Ok(_) => result.verified = Some(true),
            Err(e) => {
                result.verified = Some(false);
                result.error = Some(e.to_string());
                verify_error = Some(e);
            }
        }
    }

    writer.write(&result)?;
    match verify_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialSource;

    #[test]
    fn test_status_serializes_without_secrets() {
        let status = AuthStatus {
            credentials: CredentialStatus {
                key_id: Some("ABC123".to_string()),
                key_id_source: Some(CredentialSource::Env),
                private_key: Some("environment PEM".to_string()),
                private_key_source: Some(CredentialSource::Env),
                missing: vec!["ASC_ISSUER_ID".to_string()],
                ..Default::default()
            },
            config_path: None,
            strict_auth: false,
            token_ok: false,
            verified: None,
            error: Some("missing credentials".to_string()),
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["keyId"], "ABC123");
        assert_eq!(value["keyIdSource"], "env");
        assert_eq!(value["tokenOk"], false);
        assert!(value.get("verified").is_none());
        assert_eq!(value["missing"][0], "ASC_ISSUER_ID");
    }

    #[test]
    fn test_table_fields_name_sources() {
        let status = AuthStatus {
            credentials: CredentialStatus {
                key_id: Some("ABC123".to_string()),
                key_id_source: Some(CredentialSource::Config),
                ..Default::default()
            },
            config_path: Some("/tmp/config.toml".to_string()),
            strict_auth: false,
            token_ok: true,
            verified: Some(true),
            error: None,
        };
        let fields = status.fields();
        assert!(fields.contains(&("Key ID".to_string(), "ABC123 (config file)".to_string())));
        assert!(fields.contains(&("Verified".to_string(), "true".to_string())));
    }
}
