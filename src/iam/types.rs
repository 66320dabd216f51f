// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Role required to view and save configuration files.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug)]
pub enum IamError {
    LoadError(String),
    ParseError(String),
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IamError::LoadError(msg) => write!(f, "User directory load error: {}", msg),
            IamError::ParseError(msg) => write!(f, "User directory parse error: {}", msg),
        }
    }
}

impl std::error::Error for IamError {}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

// Structure matching the YAML file format: email → {name, roles}.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YamlUser {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Read-only directory of known users, loaded from users.yaml at startup.
/// Sessions are minted by the surrounding deployment; this service only
/// verifies them and looks the subject up here.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn load(users_file: &Path) -> Result<Self, IamError> {
        let content = fs::read_to_string(users_file).map_err(|e| {
            IamError::LoadError(format!(
                "Failed to read users file '{}': {}",
                users_file.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, IamError> {
        let yaml_users: HashMap<String, YamlUser> = serde_yaml::from_str(content)
            .map_err(|e| IamError::ParseError(format!("Failed to parse users file: {}", e)))?;

        let users = yaml_users
            .into_iter()
            .map(|(email, yaml_user)| {
                (
                    email.clone(),
                    User {
                        email,
                        name: yaml_user.name,
                        roles: yaml_user.roles,
                    },
                )
            })
            .collect();

        Ok(Self { users })
    }

    pub fn from_users(users: Vec<User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.email.clone(), user))
                .collect(),
        }
    }

    pub fn get(&self, email: &str) -> Option<&User> {
        self.users.get(email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_yaml() {
        let yaml = r#"
admin@example.com:
  name: Admin User
  roles:
    - admin
viewer@example.com:
  name: Viewer
  roles: []
"#;
        let directory = UserDirectory::parse(yaml).unwrap();
        assert_eq!(directory.len(), 2);

        let admin = directory.get("admin@example.com").unwrap();
        assert_eq!(admin.name, "Admin User");
        assert!(admin.has_role(ADMIN_ROLE));

        let viewer = directory.get("viewer@example.com").unwrap();
        assert!(!viewer.has_role(ADMIN_ROLE));
    }

    #[test]
    fn test_parse_rejects_invalid_yaml() {
        assert!(UserDirectory::parse("admin@example.com: [not a mapping").is_err());
    }

    #[test]
    fn test_missing_roles_default_empty() {
        let yaml = "someone@example.com:\n  name: Someone\n";
        let directory = UserDirectory::parse(yaml).unwrap();
        assert!(directory.get("someone@example.com").unwrap().roles.is_empty());
    }
}
