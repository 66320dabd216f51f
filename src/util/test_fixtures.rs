// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::runtime_paths::RuntimePaths;

/// Unique on-disk root for one test, removed on drop.
#[derive(Debug)]
pub struct TestFixtureRoot {
    path: PathBuf,
}

impl TestFixtureRoot {
    pub fn new_fixed(name: &str) -> std::io::Result<Self> {
        let root = fixtures_root().join(name);
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self { path: root })
    }

    pub fn new_unique(prefix: &str) -> std::io::Result<Self> {
        let name = format!("{}-{}", prefix, Uuid::new_v4());
        Self::new_fixed(&name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.path.join("themes")
    }

    pub fn active_theme_dir(&self) -> PathBuf {
        self.themes_dir().join("default")
    }

    pub fn init_theme_layout(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.active_theme_dir())?;
        Ok(())
    }

    pub fn runtime_paths(&self) -> std::io::Result<RuntimePaths> {
        self.init_theme_layout()?;
        let root = self.path.canonicalize()?;
        let themes_dir = self.themes_dir().canonicalize()?;
        let active_theme_dir = self.active_theme_dir().canonicalize()?;

        Ok(RuntimePaths {
            root: root.clone(),
            config_file: root.join("config.yaml"),
            users_file: root.join("users.yaml"),
            themes_dir,
            active_theme_dir,
            logs_dir: root.join("logs"),
        })
    }
}

impl Drop for TestFixtureRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn fixtures_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("target").join("test-fixtures")
}
