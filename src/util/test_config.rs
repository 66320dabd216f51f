// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AdminConfig, AppConfig, DevMode, EditorConfig, JwtConfig, LoggingConfig,
    RegisteredFileConfig, SecurityConfig, ServerConfig, ThemeConfig, UsersConfig,
    ValidatedConfig,
};

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5487,
                    workers: 1,
                },
                admin: AdminConfig {
                    path: "/admin".to_string(),
                },
                app: AppConfig {
                    name: "Test App".to_string(),
                    description: "Test Description".to_string(),
                },
                users: UsersConfig {
                    jwt: JwtConfig {
                        secret: "test-secret".to_string(),
                        issuer: "confedit".to_string(),
                        audience: "confedit-users".to_string(),
                        expiration_hours: 12,
                        cookie_name: "confedit_auth".to_string(),
                    },
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                security: SecurityConfig {
                    login_path: "/login".to_string(),
                    use_forwarded_for: false,
                },
                theme: ThemeConfig {
                    active: "default".to_string(),
                },
                editor: EditorConfig {
                    default_file: "section-config.json".to_string(),
                    files: Vec::new(),
                },
                dev_mode: None,
            },
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: Option<DevMode>) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    pub fn with_admin_path(mut self, path: &str) -> Self {
        self.config.admin.path = path.to_string();
        self
    }

    pub fn with_forwarded_for(mut self, enabled: bool) -> Self {
        self.config.security.use_forwarded_for = enabled;
        self
    }

    pub fn with_default_file(mut self, file: &str) -> Self {
        self.config.editor.default_file = file.to_string();
        self
    }

    pub fn with_registered_file(mut self, key: &str, file: &str, label: &str) -> Self {
        self.config.editor.files.push(RegisteredFileConfig {
            key: key.to_string(),
            file: file.to_string(),
            label: label.to_string(),
            notes: None,
        });
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
