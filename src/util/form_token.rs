// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

const FORM_TOKEN_EXPIRY_SECONDS: u64 = 3600;

#[derive(Clone, Debug)]
struct FormTokenData {
    created_at: Instant,
    session_id: String,
    scope: String,
}

/// Anti-forgery token store for rendered forms. Each token is bound to a
/// (session id, action scope) pair, so a token minted for saving one file
/// cannot authorize saving another. Valid tokens are renewed rather than
/// consumed, which keeps a re-submitted form working after an error round
/// trip.
#[derive(Clone)]
pub struct FormTokenStore {
    sender: mpsc::Sender<FormTokenCommand>,
}

enum FormTokenCommand {
    GetOrRefresh {
        session_id: String,
        scope: String,
        reply: mpsc::Sender<String>,
    },
    ValidateAndRenew {
        token_value: String,
        session_id: String,
        scope: String,
        reply: mpsc::Sender<bool>,
    },
    CleanupSession {
        session_id: String,
    },
}

impl FormTokenStore {
    pub fn new() -> Self {
        FormTokenStore {
            sender: start_form_token_worker(),
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        FORM_TOKEN_EXPIRY_SECONDS
    }

    fn generate_new_token_value() -> String {
        Uuid::new_v4().to_string()
    }

    fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<T>) -> FormTokenCommand,
        fallback: T,
    ) -> T {
        let (reply, receive) = mpsc::channel();
        if self.sender.send(build(reply)).is_err() {
            log::error!("🚨 CRITICAL: FormTokenStore channel closed");
            return fallback;
        }
        receive.recv().unwrap_or(fallback)
    }

    /// Get the current token for `(session, scope)`, minting one if needed.
    /// Rendering a form calls this so a reload keeps the same token alive.
    pub fn issue(&self, session_id: &str, scope: &str) -> String {
        self.request(
            |reply| FormTokenCommand::GetOrRefresh {
                session_id: session_id.to_string(),
                scope: scope.to_string(),
                reply,
            },
            String::new(),
        )
    }

    /// Validates a token against the session and scope it was issued for.
    /// A valid token is renewed instead of removed; a token presented with
    /// the wrong binding is dropped. Expired tokens are cleaned up first.
    pub fn validate_and_renew(&self, token_value: &str, session_id: &str, scope: &str) -> bool {
        self.request(
            |reply| FormTokenCommand::ValidateAndRenew {
                token_value: token_value.to_string(),
                session_id: session_id.to_string(),
                scope: scope.to_string(),
                reply,
            },
            false,
        )
    }

    /// Drop every token bound to a session (logout).
    pub fn cleanup_for_session(&self, session_id: &str) {
        if self
            .sender
            .send(FormTokenCommand::CleanupSession {
                session_id: session_id.to_string(),
            })
            .is_err()
        {
            log::error!("🚨 CRITICAL: FormTokenStore channel closed");
        }
    }
}

impl Default for FormTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

fn start_form_token_worker() -> mpsc::Sender<FormTokenCommand> {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::Builder::new().name("form-token-store".to_string());
    if let Err(err) = thread.spawn(move || run_form_token_worker(receiver)) {
        log::error!("FormTokenStore worker failed to start: {}", err);
    }
    sender
}

fn run_form_token_worker(receiver: mpsc::Receiver<FormTokenCommand>) {
    let mut tokens: HashMap<String, FormTokenData> = HashMap::new();
    while let Ok(command) = receiver.recv() {
        let now = Instant::now();
        cleanup_expired_tokens(&mut tokens, now);
        match command {
            FormTokenCommand::GetOrRefresh {
                session_id,
                scope,
                reply,
            } => {
                let mut refreshed = None;
                for (token_value, token_data) in tokens.iter_mut() {
                    if token_data.session_id == session_id && token_data.scope == scope {
                        token_data.created_at = now;
                        refreshed = Some(token_value.clone());
                        break;
                    }
                }

                let token_value = refreshed.unwrap_or_else(|| {
                    let new_token_value = FormTokenStore::generate_new_token_value();
                    tokens.insert(
                        new_token_value.clone(),
                        FormTokenData {
                            created_at: now,
                            session_id: session_id.clone(),
                            scope: scope.clone(),
                        },
                    );
                    log::debug!(
                        "Created form token for session {} scope {}",
                        session_id,
                        scope
                    );
                    new_token_value
                });

                let _ = reply.send(token_value);
            }
            FormTokenCommand::ValidateAndRenew {
                token_value,
                session_id,
                scope,
                reply,
            } => {
                let is_valid = match tokens.get_mut(&token_value) {
                    Some(token_data) => {
                        if token_data.session_id == session_id && token_data.scope == scope {
                            token_data.created_at = now;
                            true
                        } else {
                            log::warn!(
                                "Form token binding mismatch. Expected ({}, {}), got ({}, {})",
                                token_data.session_id,
                                token_data.scope,
                                session_id,
                                scope
                            );
                            tokens.remove(&token_value);
                            false
                        }
                    }
                    None => false,
                };
                let _ = reply.send(is_valid);
            }
            FormTokenCommand::CleanupSession { session_id } => {
                tokens.retain(|_, token_data| token_data.session_id != session_id);
                log::debug!("Cleaned up form tokens for session {}", session_id);
            }
        }
    }
}

fn cleanup_expired_tokens(tokens: &mut HashMap<String, FormTokenData>, now: Instant) {
    tokens.retain(|_, token_data| {
        now.duration_since(token_data.created_at) < Duration::from_secs(FORM_TOKEN_EXPIRY_SECONDS)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_is_stable_per_session_and_scope() {
        let store = FormTokenStore::new();

        let token1 = store.issue("session-1", "save_action_a");
        let token2 = store.issue("session-1", "save_action_a");
        assert!(!token1.is_empty());
        assert_eq!(token1, token2);

        let other_scope = store.issue("session-1", "save_action_b");
        assert_ne!(token1, other_scope);

        let other_session = store.issue("session-2", "save_action_a");
        assert_ne!(token1, other_session);
    }

    #[test]
    fn test_validate_and_renew_valid_token() {
        let store = FormTokenStore::new();
        let token = store.issue("session-1", "save_action_a");

        // Renewed, not consumed: repeated validation keeps working.
        assert!(store.validate_and_renew(&token, "session-1", "save_action_a"));
        assert!(store.validate_and_renew(&token, "session-1", "save_action_a"));
    }

    #[test]
    fn test_validate_rejects_wrong_session() {
        let store = FormTokenStore::new();
        let token = store.issue("session-1", "save_action_a");

        assert!(!store.validate_and_renew(&token, "session-2", "save_action_a"));
        // Mismatched presentation burns the token entirely.
        assert!(!store.validate_and_renew(&token, "session-1", "save_action_a"));
    }

    #[test]
    fn test_validate_rejects_wrong_scope() {
        let store = FormTokenStore::new();
        let token = store.issue("session-1", "save_action_a");

        assert!(!store.validate_and_renew(&token, "session-1", "save_action_b"));
    }

    #[test]
    fn test_validate_rejects_unknown_token() {
        let store = FormTokenStore::new();
        assert!(!store.validate_and_renew("made-up", "session-1", "save_action_a"));
    }

    #[test]
    fn test_cleanup_for_session() {
        let store = FormTokenStore::new();
        let token1 = store.issue("session-1", "save_action_a");
        let token2 = store.issue("session-2", "save_action_a");

        store.cleanup_for_session("session-1");

        assert!(!store.validate_and_renew(&token1, "session-1", "save_action_a"));
        assert!(store.validate_and_renew(&token2, "session-2", "save_action_a"));
    }

    #[test]
    fn test_token_format() {
        let store = FormTokenStore::new();
        let token = store.issue("session-1", "save_action_a");
        assert_eq!(token.len(), 36); // UUID v4
        assert_eq!(token.chars().filter(|&c| c == '-').count(), 4);
    }
}
