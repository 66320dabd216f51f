// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod embed;

use actix_web::web;

use crate::shortcode::EMBED_PATH;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(EMBED_PATH, web::get().to(embed::embed_editor))
        .route(EMBED_PATH, web::post().to(embed::embed_save));
}
