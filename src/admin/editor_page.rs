// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::editor::{self, Principal, Submission};
use crate::headers::{generate_csp_nonce, html_page_response};
use crate::locator::locate_registered;
use crate::security::sanitize_key;
use crate::templates::{EditorPageContext, FileOption, render_minijinja_template};
use crate::util::FormTokenStore;

const SELECT_FILE_HINT: &str = "Please select a file from the dropdown above to start editing.";

#[derive(Deserialize)]
pub struct EditorQuery {
    file: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveForm {
    file: String,
    edited_file_key: String,
    form_token: String,
    content: String,
}

pub async fn editor_page(
    req: HttpRequest,
    query: web::Query<EditorQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    tokens: web::Data<FormTokenStore>,
) -> Result<HttpResponse> {
    render_editor(
        &req,
        config.as_ref(),
        app_state.as_ref(),
        tokens.as_ref(),
        query.file.as_deref(),
        None,
    )
}

pub async fn editor_save(
    req: HttpRequest,
    form: web::Form<SaveForm>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    tokens: web::Data<FormTokenStore>,
) -> Result<HttpResponse> {
    render_editor(
        &req,
        config.as_ref(),
        app_state.as_ref(),
        tokens.as_ref(),
        Some(form.file.as_str()),
        Some(&form.0),
    )
}

/// One pass of the admin page state machine: no files registered, files but
/// nothing selected, or a selected file being viewed or saved.
fn render_editor(
    req: &HttpRequest,
    config: &ValidatedConfig,
    app_state: &AppState,
    tokens: &FormTokenStore,
    selection: Option<&str>,
    posted: Option<&SaveForm>,
) -> Result<HttpResponse> {
    let principal = Principal::from_request(req, config);
    let registry = &app_state.registry;

    let mut notices: Vec<String> = Vec::new();
    let mut hint = None;
    let mut selected_entry = None;

    if registry.is_empty() {
        notices.push(
            "No configuration files have been registered for editing. Deployments can use the editor.files configuration section or a registrar hook to add them."
                .to_string(),
        );
    } else {
        match selection.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw_key) => {
                let key = sanitize_key(raw_key);
                match registry.get(&key) {
                    Some(entry) => selected_entry = Some(entry.clone()),
                    None => {
                        log::warn!("Selection of unregistered file key '{}'", raw_key);
                        notices.push(format!(
                            "The selected file key '{}' is not registered for editing.",
                            key
                        ));
                    }
                }
            }
            None => hint = Some(SELECT_FILE_HINT.to_string()),
        }
    }

    let mut message = None;
    let mut content = String::new();
    let mut resolved_path = None;
    let mut extension = String::new();
    let mut form_token = None;
    let mut selected_key = None;
    let mut selected_notes = None;

    if let Some(entry) = &selected_entry {
        let located =
            locate_registered(&app_state.runtime_paths.active_theme_dir, &entry.path);
        let scope = editor::save_action_scope(&entry.key);

        // Only a form echoing the selected key counts as a submission for it.
        let submission = posted.and_then(|form| {
            if sanitize_key(&form.edited_file_key) == entry.key {
                Some(Submission {
                    token: &form.form_token,
                    content: &form.content,
                })
            } else {
                None
            }
        });

        let outcome = editor::process(
            app_state.acquire_store(),
            tokens,
            &located,
            &scope,
            submission,
            &principal,
        );

        notices.extend(outcome.notice_messages());
        message = outcome.message;
        content = outcome.content;
        resolved_path = outcome
            .resolved_path
            .map(|path| path.display().to_string());
        extension = outcome.extension;
        selected_key = Some(entry.key.clone());
        selected_notes = entry.notes.clone();

        if resolved_path.is_some() {
            if let Some(session_id) = &principal.session_id {
                form_token = Some(tokens.issue(session_id, &scope));
            }
        }
    }

    let files: Vec<FileOption> = registry
        .entries()
        .map(|entry| FileOption {
            key: entry.key.clone(),
            label: entry.label.clone(),
            file_name: entry.file_name(),
            notes: entry.notes.clone(),
            selected: selected_key.as_deref() == Some(entry.key.as_str()),
        })
        .collect();

    let csp_nonce = generate_csp_nonce();
    let context = EditorPageContext {
        app_name: config.app.name.clone(),
        editor_path: format!("{}/config-editor", config.admin.path),
        message,
        notices,
        hint,
        files,
        selected_key,
        selected_notes,
        resolved_path,
        extension,
        content,
        form_token,
        csp_nonce: csp_nonce.clone(),
    }
    .to_value();

    let html = render_minijinja_template(
        app_state.templates.as_ref(),
        "admin/editor_page.html",
        context,
    )
    .map_err(|err| {
        log::error!("Failed to render editor page template: {}", err);
        actix_web::error::ErrorInternalServerError("Template rendering failed")
    })?;

    Ok(html_page_response(html, &csp_nonce))
}
