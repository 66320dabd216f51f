// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{ConfigError, ValidatedConfig};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub users_file: PathBuf,
    pub themes_dir: PathBuf,
    /// Sandbox root for every editable file.
    pub active_theme_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path, config: &ValidatedConfig) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = root_path.canonicalize().map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to canonicalize runtime root '{}': {}",
                root_path.display(),
                e
            ))
        })?;

        let config_file = root_canonical.join("config.yaml");
        let users_file = root_canonical.join("users.yaml");

        let themes_dir = root_canonical.join("themes");
        let active_theme_dir = themes_dir.join(&config.theme.active);
        let logs_dir = root_canonical.join("logs");

        ensure_dir_exists(&themes_dir)?;
        ensure_dir_exists(&active_theme_dir)?;

        let themes_dir = themes_dir.canonicalize().map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to canonicalize themes directory '{}': {}",
                themes_dir.display(),
                e
            ))
        })?;
        let active_theme_dir = active_theme_dir.canonicalize().map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to canonicalize active theme directory '{}': {}",
                active_theme_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            root: root_canonical,
            config_file,
            users_file,
            themes_dir,
            active_theme_dir,
            logs_dir,
        })
    }
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    ensure_dir_writable(path, "Directory must be writable")?;
    Ok(())
}

fn ensure_dir_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a directory): {}",
            context,
            path.display()
        )));
    }

    let probe_name = format!(".confedit-write-check-{}", Uuid::new_v4());
    let probe_path = path.join(probe_name);

    let probe_result = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe_path);

    match probe_result {
        Ok(_) => {
            if let Err(err) = fs::remove_file(&probe_path) {
                return Err(ConfigError::ValidationError(format!(
                    "{} (unable to clean probe file {}): {}",
                    context,
                    probe_path.display(),
                    err
                )));
            }
            Ok(())
        }
        Err(err) => Err(ConfigError::ValidationError(format!(
            "{} ({}): {}",
            context,
            path.display(),
            err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::test_config;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn test_from_root_creates_theme_layout() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths").unwrap();
        let config = test_config();

        let paths = RuntimePaths::from_root(fixture.path(), &config).unwrap();
        assert!(paths.themes_dir.is_dir());
        assert!(paths.active_theme_dir.is_dir());
        assert!(paths.active_theme_dir.starts_with(&paths.themes_dir));
        assert_eq!(
            paths.active_theme_dir.file_name().unwrap().to_string_lossy(),
            config.theme.active
        );
    }
}
