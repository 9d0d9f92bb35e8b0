//
//  asc-cli
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Low-level helpers used by [`Config`](super::Config). Errors carry the path
//! so `asc config` can report which file was involved.

use std::path::Path;

use anyhow::{Context, Result};

/// Reads the contents of a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))
}

/// Writes a configuration file, creating parent directories as needed.
///
/// The content is written to a sibling temporary file first and renamed into
/// place, so a crash never leaves a half-written config behind.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let staging = path.with_extension("toml.tmp");
    std::fs::write(&staging, content)
        .with_context(|| format!("failed to write {}", staging.display()))?;
    std::fs::rename(&staging, path)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

/// Whether a configuration file exists at `path`.
pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}
