// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::HttpRequest;
use std::path::PathBuf;

use crate::config::ValidatedConfig;
use crate::iam::{ADMIN_ROLE, AuthRequest};
use crate::locator::Located;
use crate::security::is_dev_mode_bypass_allowed;
use crate::util::FormTokenStore;

pub mod store;

pub use store::{FileStore, LocalFileStore};

pub const SAVE_SUCCESS_MESSAGE: &str = "Configuration saved successfully.";

const SAVE_ACTION_PREFIX: &str = "save_action_";

/// Token scope for saves from the admin page, bound to one registry key.
pub fn save_action_scope(key: &str) -> String {
    format!("{}{}", SAVE_ACTION_PREFIX, key)
}

/// Fixed token scope for saves from the embeddable form.
pub const EMBED_SAVE_SCOPE: &str = "save_action_embed";

/// One user-facing condition raised while processing a request.
/// Notices accumulate; a request can surface several at once.
#[derive(Debug, Clone)]
pub enum EditorNotice {
    FileNotFound { name: String, probed: PathBuf },
    OutsideThemeDir { name: String },
    NotWritable { path: PathBuf },
    InvalidJson { detail: String },
    WriteFailure,
    ReadFailure,
    PermissionDenied,
    StoreUnavailable,
}

impl EditorNotice {
    pub fn message(&self) -> String {
        match self {
            EditorNotice::FileNotFound { name, probed } => format!(
                "Error: Configuration file {} not found in the active theme directory: {}",
                name,
                probed.display()
            ),
            EditorNotice::OutsideThemeDir { name } => format!(
                "Error: Configuration file {} is not inside the active theme directory and cannot be edited.",
                name
            ),
            EditorNotice::NotWritable { path } => format!(
                "Warning: The configuration file {} is not writable. Please check server permissions.",
                path.display()
            ),
            EditorNotice::InvalidJson { detail } => format!(
                "Error: The entered text is not valid JSON. ({})",
                detail
            ),
            EditorNotice::WriteFailure => {
                "Error writing to the configuration file. Please check file permissions or disk space."
                    .to_string()
            }
            EditorNotice::ReadFailure => "Error reading the configuration file.".to_string(),
            EditorNotice::PermissionDenied => {
                "You do not have sufficient permissions to save this configuration.".to_string()
            }
            EditorNotice::StoreUnavailable => {
                "Error: The filesystem service could not be initialized.".to_string()
            }
        }
    }
}

/// Result of one editor request. Constructed fresh per request, never persisted.
#[derive(Debug, Default)]
pub struct EditorOutcome {
    pub message: Option<String>,
    pub notices: Vec<EditorNotice>,
    pub content: String,
    pub resolved_path: Option<PathBuf>,
    pub extension: String,
}

impl EditorOutcome {
    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    pub fn notice_messages(&self) -> Vec<String> {
        self.notices.iter().map(|notice| notice.message()).collect()
    }
}

/// The caller's identity as far as the editor cares: a session to bind form
/// tokens to, and whether the manage permission is held. Both entry points
/// build this the same way, so the permission rule lives in one place.
#[derive(Debug, Clone)]
pub struct Principal {
    pub session_id: Option<String>,
    pub can_manage: bool,
}

impl Principal {
    pub fn from_request(req: &HttpRequest, config: &ValidatedConfig) -> Self {
        if let Some(jwt_id) = req.jwt_id() {
            return Principal {
                can_manage: req.has_role(ADMIN_ROLE),
                session_id: Some(jwt_id),
            };
        }

        if is_dev_mode_bypass_allowed(req, config) {
            return Principal {
                session_id: Some("localhost".to_string()),
                can_manage: true,
            };
        }

        Principal {
            session_id: None,
            can_manage: false,
        }
    }
}

/// A posted form: the security token and the edited text, exactly as submitted.
#[derive(Debug)]
pub struct Submission<'a> {
    pub token: &'a str,
    pub content: &'a str,
}

/// Core processing shared by the admin page and the embeddable form.
///
/// Validates the submission token against `(session, scope)`, enforces the
/// manage permission, optionally validates JSON, performs at most one write
/// and at most one read through `store`, and accumulates notices instead of
/// failing. A missing or invalid token downgrades the request to a plain
/// view: no write happens and no error is surfaced for it.
pub fn process(
    store: Option<&dyn FileStore>,
    tokens: &FormTokenStore,
    located: &Located,
    scope: &str,
    submission: Option<Submission<'_>>,
    principal: &Principal,
) -> EditorOutcome {
    let mut outcome = EditorOutcome::default();

    let (path, extension) = match located {
        Located::Found { path, extension } => (path.clone(), extension.clone()),
        Located::Missing { name, probed } => {
            outcome.notices.push(EditorNotice::FileNotFound {
                name: name.clone(),
                probed: probed.clone(),
            });
            return outcome;
        }
        Located::Unsafe { name } => {
            outcome
                .notices
                .push(EditorNotice::OutsideThemeDir { name: name.clone() });
            return outcome;
        }
    };

    outcome.resolved_path = Some(path.clone());
    outcome.extension = extension;

    if let Some(store) = store {
        if !store.is_writable(&path) {
            outcome
                .notices
                .push(EditorNotice::NotWritable { path: path.clone() });
        }
    }

    if let Some(submission) = submission {
        let token_valid = match principal.session_id.as_deref() {
            Some(session_id) => tokens.validate_and_renew(submission.token, session_id, scope),
            None => false,
        };

        if token_valid {
            if !principal.can_manage {
                outcome.notices.push(EditorNotice::PermissionDenied);
                // Fall through and show the current content instead.
            } else {
                let new_content = submission.content;
                let mut can_save = true;

                if outcome.extension == "json" {
                    if let Err(err) = serde_json::from_str::<serde_json::Value>(new_content) {
                        outcome.notices.push(EditorNotice::InvalidJson {
                            detail: err.to_string(),
                        });
                        // Preserve the rejected input so it is not lost.
                        outcome.content = new_content.to_string();
                        can_save = false;
                    }
                }

                if can_save {
                    match store {
                        Some(store) => match store.write(&path, new_content) {
                            Ok(()) => {
                                outcome.message = Some(SAVE_SUCCESS_MESSAGE.to_string());
                                outcome.content = new_content.to_string();
                            }
                            Err(err) => {
                                log::error!(
                                    "Failed to write config file '{}': {}",
                                    path.display(),
                                    err
                                );
                                outcome.notices.push(EditorNotice::WriteFailure);
                                outcome.content = new_content.to_string();
                            }
                        },
                        None => {
                            outcome.notices.push(EditorNotice::StoreUnavailable);
                            outcome.content = new_content.to_string();
                        }
                    }
                }
            }
        }
    }

    // Show the current file content unless a save attempt already decided
    // what to display. An empty file legitimately renders an empty editor.
    if outcome.content.is_empty() && outcome.message.is_none() {
        match store {
            Some(store) => match store.read_to_string(&path) {
                Ok(current) => outcome.content = current,
                Err(err) => {
                    log::error!("Failed to read config file '{}': {}", path.display(), err);
                    outcome.notices.push(EditorNotice::ReadFailure);
                }
            },
            None => outcome.notices.push(EditorNotice::StoreUnavailable),
        }
    }

    outcome
}
