//
//  asc-cli
//  metadata/local.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Reading the local metadata directory.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{validate_locale, FieldMap, LocaleFields, RemoteSnapshot, Scope, DEFAULT_LOCALE};
use crate::error::AscError;

/// Locale files of one scope, plus the optional `default.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalScope {
    pub locales: LocaleFields,
    pub default: Option<FieldMap>,
}

impl LocalScope {
    /// Seeds every remote locale without its own file from `default.json`.
    ///
    /// With `allow_deletes` the fallback is off: a missing file then means
    /// the locale should go.
    pub fn with_fallback<'a>(&self, remote_locales: impl Iterator<Item = &'a String>, allow_deletes: bool) -> LocaleFields {
        let mut result = self.locales.clone();
        let Some(default) = self.default.as_ref().filter(|_| !allow_deletes) else {
            return result;
        };
        for locale in remote_locales {
            if locale != DEFAULT_LOCALE && !result.contains_key(locale) {
                result.insert(locale.clone(), default.clone());
            }
        }
        result
    }
}

/// Everything read from a metadata directory for one version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalMetadata {
    pub app_info: LocalScope,
    pub version: LocalScope,
}

impl LocalMetadata {
    /// Local fields after the default-locale fallback, per scope.
    pub fn effective(&self, remote: &RemoteSnapshot, allow_deletes: bool) -> EffectiveLocal {
        EffectiveLocal {
            app_info: self.app_info.with_fallback(remote.app_info.keys(), allow_deletes),
            version: self.version.with_fallback(remote.version.keys(), allow_deletes),
        }
    }
}

/// Local fields the planner compares against the remote snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveLocal {
    pub app_info: LocaleFields,
    pub version: LocaleFields,
}

impl EffectiveLocal {
    pub fn scope(&self, scope: Scope) -> &LocaleFields {
        match scope {
            Scope::AppInfo => &self.app_info,
            Scope::Version => &self.version,
        }
    }
}

/// Loads `app-info/*.json` and `version/<version>/*.json` under `dir`.
///
/// # Errors
///
/// [`AscError::Usage`] for invalid locale file names, unknown fields,
/// non-string values, empty files, or a tree with no metadata files at all.
pub fn load_local_metadata(dir: &Path, version: &str, includes: &[Scope]) -> Result<LocalMetadata, AscError> {
    let mut local = LocalMetadata::default();

    if includes.contains(&Scope::AppInfo) {
        local.app_info = load_locale_dir(&dir.join(Scope::AppInfo.as_str()), Scope::AppInfo)?;
    }
    if includes.contains(&Scope::Version) {
        local.version = load_locale_dir(&dir.join(Scope::Version.as_str()).join(version), Scope::Version)?;
    }

    let files = [&local.app_info, &local.version]
        .iter()
        .map(|s| s.locales.len() + usize::from(s.default.is_some()))
        .sum::<usize>();
    if files == 0 {
        return Err(AscError::usage(format!(
            "no metadata .json files found in {}",
            dir.display()
        )));
    }
    Ok(local)
}

/// Loads every `<locale>.json` in one directory. A missing directory is empty.
pub fn load_locale_dir(dir: &Path, scope: Scope) -> Result<LocalScope, AscError> {
    let mut result = LocalScope::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
        Err(e) => {
            return Err(AscError::Config(format!("failed to read {}: {e}", dir.display())));
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let locale = validate_locale(&name).map_err(|e| {
            AscError::usage(format!(
                "invalid {scope} localization file {:?}: {e}",
                path.file_name().unwrap_or_default()
            ))
        })?;

        let fields = read_locale_file(&path, scope)?;
        if locale == DEFAULT_LOCALE {
            result.default = Some(fields);
        } else {
            result.locales.insert(locale, fields);
        }
    }

    Ok(result)
}

/// Reads one localization file into trimmed, non-empty fields.
pub fn read_locale_file(path: &Path, scope: Scope) -> Result<FieldMap, AscError> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| AscError::usage(format!("invalid metadata schema in {}: {e}", path.display())))?;
    let Value::Object(object) = value else {
        return Err(AscError::usage(format!(
            "invalid metadata schema in {}: expected a JSON object",
            path.display()
        )));
    };

    let mut fields = FieldMap::new();
    for (key, value) in object {
        if !scope.fields().contains(&key.as_str()) {
            return Err(AscError::usage(format!(
                "invalid metadata schema in {}: unknown field {key:?}",
                path.display()
            )));
        }
        let text = match value {
            Value::String(s) => s,
            Value::Null => continue,
            _ => {
                return Err(AscError::usage(format!(
                    "invalid metadata schema in {}: field {key:?} must be a string",
                    path.display()
                )))
            }
        };
        let text = text.trim();
        if !text.is_empty() {
            fields.insert(key, text.to_string());
        }
    }

    if fields.is_empty() {
        return Err(AscError::usage(format!(
            "invalid metadata in {}: at least one {scope} field is required",
            path.display()
        )));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, body: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_loads_both_scopes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app-info/en-US.json", r#"{"name":"  Sync  ","subtitle":""}"#);
        write(dir.path(), "app-info/default.json", r#"{"name":"Sync"}"#);
        write(dir.path(), "version/2.0/de-DE.json", r#"{"description":"Dateien"}"#);
        write(dir.path(), "version/2.0/notes.txt", "ignored");

        let local = load_local_metadata(dir.path(), "2.0", &[Scope::AppInfo, Scope::Version]).unwrap();
        assert_eq!(local.app_info.locales["en-US"].get("name").unwrap(), "Sync");
        assert!(local.app_info.locales["en-US"].get("subtitle").is_none());
        assert!(local.app_info.default.is_some());
        assert_eq!(local.version.locales["de-DE"]["description"], "Dateien");
    }

    #[test]
    fn test_includes_limit_scopes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app-info/en-US.json", r#"{"name":"Sync"}"#);

        let err = load_local_metadata(dir.path(), "2.0", &[Scope::Version]).unwrap_err();
        assert!(err.to_string().starts_with("no metadata .json files found"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_rejects_bad_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app-info/en-US.json", r#"{"title":"Sync"}"#);
        let err = load_locale_dir(&dir.path().join("app-info"), Scope::AppInfo).unwrap_err();
        assert!(err.to_string().contains(r#"unknown field "title""#));

        let dir = TempDir::new().unwrap();
        write(dir.path(), "version/en_US.json", r#"{"description":"x"}"#);
        let err = load_locale_dir(&dir.path().join("version"), Scope::Version).unwrap_err();
        assert!(err.to_string().contains("invalid version localization file"));

        let dir = TempDir::new().unwrap();
        write(dir.path(), "version/en-US.json", r#"{"keywords":["a"]}"#);
        assert!(load_locale_dir(&dir.path().join("version"), Scope::Version).is_err());

        let dir = TempDir::new().unwrap();
        write(dir.path(), "version/en-US.json", r#"{"keywords":"   "}"#);
        assert!(load_locale_dir(&dir.path().join("version"), Scope::Version).is_err());
    }

    #[test]
    fn test_default_fallback() {
        let mut scope = LocalScope::default();
        scope.locales.insert("en-US".into(), FieldMap::from([("name".into(), "Sync".into())]));
        scope.default = Some(FieldMap::from([("name".into(), "Sync Default".into())]));

        let remote = ["en-US".to_string(), "fr-FR".to_string()];
        let seeded = scope.with_fallback(remote.iter(), false);
        assert_eq!(seeded["fr-FR"]["name"], "Sync Default");
        assert_eq!(seeded["en-US"]["name"], "Sync");

        let strict = scope.with_fallback(remote.iter(), true);
        assert!(!strict.contains_key("fr-FR"));
    }
}
