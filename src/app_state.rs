// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::editor::{FileStore, LocalFileStore};
use crate::registry::{FileRegistry, RegistrarFn};
use crate::runtime_paths::RuntimePaths;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub runtime_paths: RuntimePaths,
    pub registry: FileRegistry,
    pub file_store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(
        config: &ValidatedConfig,
        runtime_paths: RuntimePaths,
        registrars: &[RegistrarFn],
    ) -> Self {
        let registry = FileRegistry::build(config, &runtime_paths.active_theme_dir, registrars);
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            runtime_paths,
            registry,
            file_store: Arc::new(LocalFileStore),
        }
    }

    /// The filesystem service handed to the processor per call.
    pub fn acquire_store(&self) -> Option<&dyn FileStore> {
        Some(self.file_store.as_ref())
    }
}
