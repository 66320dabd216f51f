// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::security::sanitize_key;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DevMode {
    Localhost,
    Dangerous,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default)]
    pub use_forwarded_for: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            use_forwarded_for: false,
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub expiration_hours: u64,
    #[serde(default = "default_jwt_cookie_name")]
    pub cookie_name: String,
}

fn default_jwt_issuer() -> String {
    "confedit".to_string()
}

fn default_jwt_audience() -> String {
    "confedit-users".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    12
}

fn default_jwt_cookie_name() -> String {
    "confedit_auth".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UsersConfig {
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThemeConfig {
    #[serde(default = "default_active_theme")]
    pub active: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            active: default_active_theme(),
        }
    }
}

fn default_active_theme() -> String {
    "default".to_string()
}

/// One editable file contributed through config.yaml.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegisteredFileConfig {
    pub key: String,
    /// File name relative to the active theme directory.
    pub file: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "default_editor_file")]
    pub default_file: String,
    #[serde(default)]
    pub files: Vec<RegisteredFileConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_file: default_editor_file(),
            files: Vec::new(),
        }
    }
}

fn default_editor_file() -> String {
    "section-config.json".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub users: UsersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    pub dev_mode: Option<DevMode>,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub users: UsersConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub theme: ThemeConfig,
    pub editor: EditorConfig,
    pub dev_mode: Option<DevMode>,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;
        config.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if !self.admin.path.starts_with('/') || self.admin.path.len() < 2 {
            return Err(ConfigError::ValidationError(format!(
                "Admin path must be absolute and non-root, got: '{}'",
                self.admin.path
            )));
        }
        if self.admin.path.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "Admin path must not end with '/'".to_string(),
            ));
        }

        if self.users.jwt.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT secret must not be empty".to_string(),
            ));
        }

        Self::validate_logging(&self.logging)?;
        Self::validate_theme(&self.theme)?;
        Self::validate_editor(&self.editor)?;

        let dev_mode = if let Some(dev_mode) = self.dev_mode.clone() {
            if cfg!(debug_assertions) {
                match dev_mode {
                    DevMode::Dangerous => {
                        warn!(
                            "🚨 WARNING: Development mode set to 'dangerous' - ALL access controls are bypassed!"
                        );
                        warn!("🚨 This should NEVER be used in production!");
                    }
                    DevMode::Localhost => {
                        warn!("🔧 Development mode enabled for localhost connections");
                    }
                }
                Some(dev_mode)
            } else {
                warn!(
                    "🚨 WARNING: dev_mode is configured but ignored in release builds; remove it from config.yaml"
                );
                None
            }
        } else {
            None
        };

        Ok(ValidatedConfig {
            server: self.server,
            admin: self.admin,
            app: self.app,
            users: self.users,
            logging: self.logging,
            security: self.security,
            theme: self.theme,
            editor: self.editor,
            dev_mode,
        })
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        match logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown logging level '{}'; expected error, warn, info, debug or trace",
                other
            ))),
        }
    }

    fn validate_theme(theme: &ThemeConfig) -> Result<(), ConfigError> {
        let name = theme.active.as_str();
        if name.is_empty() {
            return Err(ConfigError::ValidationError(
                "Active theme name must not be empty".to_string(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(ConfigError::ValidationError(format!(
                "Active theme name '{}' may only contain lowercase letters, numbers, dashes and underscores",
                name
            )));
        }
        Ok(())
    }

    fn validate_editor(editor: &EditorConfig) -> Result<(), ConfigError> {
        if editor.default_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "editor.default_file must not be empty".to_string(),
            ));
        }
        // Registration itself discards bad entries with a logged warning, but a key
        // that normalizes to nothing in the static config is a deployment mistake.
        for entry in &editor.files {
            if sanitize_key(&entry.key).is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "editor.files entry has an unusable key: '{}'",
                    entry.key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::TestConfigBuilder;

    fn base_config() -> Config {
        let validated = TestConfigBuilder::new().build();
        Config {
            server: validated.server,
            admin: validated.admin,
            app: validated.app,
            users: validated.users,
            logging: validated.logging,
            security: validated.security,
            theme: validated.theme,
            editor: validated.editor,
            dev_mode: None,
        }
    }

    #[test]
    fn test_validate_accepts_base_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_admin_path() {
        let mut config = base_config();
        config.admin.path = "admin".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_trailing_slash_admin_path() {
        let mut config = base_config();
        config.admin.path = "/admin/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_jwt_secret() {
        let mut config = base_config();
        config.users.jwt.secret = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_theme_name() {
        let mut config = base_config();
        config.theme.active = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = base_config();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_registry_key() {
        let mut config = base_config();
        config.editor.files.push(RegisteredFileConfig {
            key: "!!!".to_string(),
            file: "broken.json".to_string(),
            label: "Broken".to_string(),
            notes: None,
        });
        assert!(config.validate().is_err());
    }
}
