// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ValidatedConfig;
use crate::security::sanitize_key;

/// One editable file exposed through the admin page selector.
#[derive(Debug, Clone)]
pub struct RegisteredFile {
    pub key: String,
    /// Absolute path inside the active theme directory. Existence and
    /// containment are re-checked per request by the locator.
    pub path: PathBuf,
    pub label: String,
    pub notes: Option<String>,
}

impl RegisteredFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Callback through which embedding code contributes registry entries at startup.
pub type RegistrarFn = Box<dyn Fn(&mut FileRegistry) + Send + Sync>;

/// Registry of editable files, keyed by normalized identifier.
/// Entries are kept in sorted order for a stable selector dropdown.
pub struct FileRegistry {
    theme_dir: PathBuf,
    entries: BTreeMap<String, RegisteredFile>,
}

impl FileRegistry {
    pub fn new(theme_dir: &Path) -> Self {
        Self {
            theme_dir: theme_dir.to_path_buf(),
            entries: BTreeMap::new(),
        }
    }

    /// Build the registry from the config section, then run the registrar hooks.
    pub fn build(
        config: &ValidatedConfig,
        theme_dir: &Path,
        registrars: &[RegistrarFn],
    ) -> Self {
        let mut registry = Self::new(theme_dir);
        for entry in &config.editor.files {
            registry.register(&entry.key, &entry.file, &entry.label, entry.notes.clone());
        }
        for registrar in registrars {
            registrar(&mut registry);
        }
        registry
    }

    /// Register one editable file. `file` is a name relative to the active
    /// theme directory. Unusable contributions are discarded with a logged
    /// warning rather than failing the whole registry.
    pub fn register(&mut self, key: &str, file: &str, label: &str, notes: Option<String>) {
        let normalized = sanitize_key(key);
        if normalized.is_empty() {
            warn!("Discarding registered file with unusable key '{}'", key);
            return;
        }
        if file.trim().is_empty() {
            warn!(
                "Discarding registered file '{}' with empty file name",
                normalized
            );
            return;
        }

        let label = if label.trim().is_empty() {
            normalized.clone()
        } else {
            label.trim().to_string()
        };

        let path = self.theme_dir.join(file.trim_start_matches('/'));
        if self
            .entries
            .insert(
                normalized.clone(),
                RegisteredFile {
                    key: normalized.clone(),
                    path,
                    label,
                    notes,
                },
            )
            .is_some()
        {
            warn!("Registered file key '{}' redefined; last one wins", normalized);
        }
    }

    pub fn get(&self, key: &str) -> Option<&RegisteredFile> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegisteredFile> {
        self.entries.values()
    }
}
