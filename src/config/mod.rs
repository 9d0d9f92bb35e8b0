//
//  asc-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the optional TOML file holding non-secret defaults for the
//! CLI. Flags and `ASC_*` environment variables always win over the file; the
//! file wins over hard-coded defaults.
//!
//! ## Configuration File Location
//!
//! `ASC_CONFIG_PATH` when set, otherwise the platform config directory:
//!
//! - **Linux**: `~/.config/asc/config.toml`
//! - **macOS**: `~/Library/Application Support/asc/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\asc\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [auth]
//! key_id = "ABC123DEFG"
//! issuer_id = "69a6de7e-0000-47e3-e053-5b8c7c11a4d1"
//! private_key_path = "~/keys/AuthKey_ABC123DEFG.p8"
//!
//! [defaults]
//! app_id = "1234567890"
//! default_output = "table"
//! timeout = "90s"
//!
//! [http]
//! max_retries = 4
//! base_delay = "200ms"
//! max_delay = "5s"
//! ```
//!
//! Only the key *path* is ever stored. Inline keys live in the environment.

mod file;

pub use file::*;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::RetryPolicy;
use crate::output::OutputFormat;
use crate::util::parse_duration;

/// Environment variable overriding the config file location.
pub const ENV_CONFIG_PATH: &str = "ASC_CONFIG_PATH";

/// Keys accepted by `asc config get|set|unset`.
pub const VALID_KEYS: &[&str] = &[
    "key_id",
    "issuer_id",
    "private_key_path",
    "app_id",
    "vendor_number",
    "analytics_vendor_number",
    "default_output",
    "timeout",
    "max_retries",
    "base_delay",
    "max_delay",
];

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// API key identification. Never holds key material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
}

/// Defaults applied when neither a flag nor an environment variable is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// App used when `--app` is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_vendor_number: Option<String>,

    /// One of `json`, `ndjson`, `table`, `markdown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output: Option<String>,

    /// Invocation deadline, e.g. `90s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Transport retry tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<String>,
}

impl Config {
    /// Loads the configuration from [`Config::config_path`], or defaults when
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content).map_err(|e| anyhow!("invalid config file {}: {e}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// `ASC_CONFIG_PATH`, else `<config dir>/asc/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = crate::util::env_var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "asc")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Reads a key by its flat name.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "key_id" => self.auth.key_id.clone(),
            "issuer_id" => self.auth.issuer_id.clone(),
            "private_key_path" => self.auth.private_key_path.clone(),
            "app_id" => self.defaults.app_id.clone(),
            "vendor_number" => self.defaults.vendor_number.clone(),
            "analytics_vendor_number" => self.defaults.analytics_vendor_number.clone(),
            "default_output" => self.defaults.default_output.clone(),
            "timeout" => self.defaults.timeout.clone(),
            "max_retries" => self.http.max_retries.map(|n| n.to_string()),
            "base_delay" => self.http.base_delay.clone(),
            "max_delay" => self.http.max_delay.clone(),
            _ => None,
        }
    }

    /// Sets a key after validating its value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim().to_string();
        if value.is_empty() {
            bail!("value for {key} must not be empty");
        }

        match key {
            "key_id" => self.auth.key_id = Some(value),
            "issuer_id" => self.auth.issuer_id = Some(value),
            "private_key_path" => self.auth.private_key_path = Some(value),
            "app_id" => self.defaults.app_id = Some(value),
            "vendor_number" => self.defaults.vendor_number = Some(value),
            "analytics_vendor_number" => self.defaults.analytics_vendor_number = Some(value),
            "default_output" => {
                OutputFormat::parse(&value)?;
                self.defaults.default_output = Some(value);
            }
            "timeout" => {
                parse_duration(&value)?;
                self.defaults.timeout = Some(value);
            }
            "max_retries" => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| anyhow!("max_retries must be a non-negative integer"))?;
                self.http.max_retries = Some(n);
            }
            "base_delay" => {
                parse_duration(&value)?;
                self.http.base_delay = Some(value);
            }
            "max_delay" => {
                parse_duration(&value)?;
                self.http.max_delay = Some(value);
            }
            _ => bail!(
                "Unknown config key: {key}. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Clears a key. Returns whether it was set.
    pub fn unset(&mut self, key: &str) -> Result<bool> {
        let slot_was_set = self.get(key).is_some();
        match key {
            "key_id" => self.auth.key_id = None,
            "issuer_id" => self.auth.issuer_id = None,
            "private_key_path" => self.auth.private_key_path = None,
            "app_id" => self.defaults.app_id = None,
            "vendor_number" => self.defaults.vendor_number = None,
            "analytics_vendor_number" => self.defaults.analytics_vendor_number = None,
            "default_output" => self.defaults.default_output = None,
            "timeout" => self.defaults.timeout = None,
            "max_retries" => self.http.max_retries = None,
            "base_delay" => self.http.base_delay = None,
            "max_delay" => self.http.max_delay = None,
            _ => bail!("Unknown config key: {key}"),
        }
        Ok(slot_was_set)
    }

    /// All set keys in [`VALID_KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        VALID_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    /// Retry policy with config overrides applied.
    ///
    /// `max_retries` counts retries, so the attempt budget is one more.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let mut policy = RetryPolicy::default();
        if let Some(retries) = self.http.max_retries {
            policy.max_attempts = retries.saturating_add(1);
        }
        if let Some(delay) = &self.http.base_delay {
            policy.base_delay = parse_duration(delay)?;
        }
        if let Some(delay) = &self.http.max_delay {
            policy.max_delay = parse_duration(delay)?;
        }
        if policy.max_delay < policy.base_delay {
            policy.max_delay = policy.base_delay;
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_unset() {
        let mut config = Config::default();
        config.set("app_id", "123456").unwrap();
        config.set("default_output", "table").unwrap();
        assert_eq!(config.get("app_id").as_deref(), Some("123456"));
        assert!(config.unset("app_id").unwrap());
        assert!(!config.unset("app_id").unwrap());
        assert_eq!(config.entries(), vec![("default_output", "table".to_string())]);
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("default_output", "yaml").is_err());
        assert!(config.set("timeout", "soon").is_err());
        assert!(config.set("max_retries", "-1").is_err());
        assert!(config.set("upload_timeout", "1m").is_err());
        assert!(config.set("key_id", "  ").is_err());
    }

    #[test]
    fn test_round_trip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("key_id", "ABC").unwrap();
        config.set("max_retries", "2").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[auth]"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth\nkey_id=").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_retry_policy_overrides() {
        let mut config = Config::default();
        config.set("max_retries", "0").unwrap();
        config.set("base_delay", "1s").unwrap();
        config.set("max_delay", "500ms").unwrap();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(1));
    }
}
