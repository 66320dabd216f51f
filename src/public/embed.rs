// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::editor::{Principal, Submission};
use crate::shortcode::{
    Shortcode, ShortcodeContext, handle_config_editor_shortcode, parse_shortcode,
};
use crate::util::FormTokenStore;

#[derive(Deserialize)]
pub struct EmbedQuery {
    filename: Option<String>,
    /// Raw embed tag markup, passed through verbatim by a host page.
    sc: Option<String>,
}

#[derive(Deserialize)]
pub struct EmbedSaveForm {
    filename: String,
    form_token: String,
    content: String,
}

pub async fn embed_editor(
    req: HttpRequest,
    query: web::Query<EmbedQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    tokens: web::Data<FormTokenStore>,
) -> Result<HttpResponse> {
    let shortcode = match &query.sc {
        Some(raw) => match parse_shortcode(raw) {
            Some((shortcode, _consumed)) => shortcode,
            None => {
                log::warn!("Unparseable embed tag: {}", raw);
                return Ok(fragment_response(
                    "<p><strong>The embed tag could not be parsed.</strong></p>".to_string(),
                ));
            }
        },
        None => Shortcode::config_editor(query.filename.clone()),
    };

    render_fragment(
        &req,
        config.as_ref(),
        app_state.as_ref(),
        tokens.as_ref(),
        &shortcode,
        None,
    )
}

pub async fn embed_save(
    req: HttpRequest,
    form: web::Form<EmbedSaveForm>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    tokens: web::Data<FormTokenStore>,
) -> Result<HttpResponse> {
    let shortcode = Shortcode::config_editor(Some(form.filename.clone()));
    let submission = Submission {
        token: &form.form_token,
        content: &form.content,
    };

    render_fragment(
        &req,
        config.as_ref(),
        app_state.as_ref(),
        tokens.as_ref(),
        &shortcode,
        Some(submission),
    )
}

fn render_fragment(
    req: &HttpRequest,
    config: &ValidatedConfig,
    app_state: &AppState,
    tokens: &FormTokenStore,
    shortcode: &Shortcode,
    submission: Option<Submission<'_>>,
) -> Result<HttpResponse> {
    let principal = Principal::from_request(req, config);
    let ctx = ShortcodeContext {
        config,
        app_state,
        tokens,
        principal: &principal,
    };

    match handle_config_editor_shortcode(shortcode, &ctx, submission) {
        Ok(html) => Ok(fragment_response(html)),
        Err(err) => {
            log::warn!("Embed editor rejected request: {}", err);
            Ok(fragment_response(
                "<p><strong>Error: Configuration file could not be processed or was not found.</strong></p>"
                    .to_string(),
            ))
        }
    }
}

fn fragment_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header(("X-Content-Type-Options", "nosniff"))
        .body(html)
}
