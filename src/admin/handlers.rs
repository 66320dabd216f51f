// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::{editor_page, middleware};
use crate::config::ValidatedConfig;
use actix_web::{HttpResponse, Result, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, admin_path: &str, config: &Arc<ValidatedConfig>) {
    let admin_path_for_redirect = admin_path.to_string();

    // Apply authentication middleware to all admin routes
    cfg.service(
        web::scope(admin_path)
            .wrap(middleware::RequireAdminMiddleware::new(config.clone()))
            .route(
                "",
                web::get().to(move || {
                    admin_redirect_to_editor(admin_path_for_redirect.clone())
                }),
            )
            .route(
                "/config-editor",
                web::get().to(editor_page::editor_page),
            )
            .route(
                "/config-editor",
                web::post().to(editor_page::editor_save),
            ),
    );
}

async fn admin_redirect_to_editor(admin_path: String) -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header(("Location", format!("{}/config-editor", admin_path)))
        .finish())
}
