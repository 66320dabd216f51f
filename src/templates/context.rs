// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Value, context};
use serde::Serialize;

const BULMA_CSS: &str = "https://cdn.jsdelivr.net/npm/bulma@0.9.4/css/bulma.min.css";

/// One entry of the file selector dropdown.
#[derive(Debug, Clone, Serialize)]
pub struct FileOption {
    pub key: String,
    pub label: String,
    pub file_name: String,
    pub notes: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct EditorPageContext {
    pub app_name: String,
    pub editor_path: String,
    pub message: Option<String>,
    pub notices: Vec<String>,
    pub hint: Option<String>,
    pub files: Vec<FileOption>,
    pub selected_key: Option<String>,
    pub selected_notes: Option<String>,
    pub resolved_path: Option<String>,
    pub extension: String,
    pub content: String,
    pub form_token: Option<String>,
    pub csp_nonce: String,
}

impl EditorPageContext {
    pub fn to_value(&self) -> Value {
        context! {
            bulma_css => BULMA_CSS,
            app_name => &self.app_name,
            editor_path => &self.editor_path,
            message => &self.message,
            notices => &self.notices,
            hint => &self.hint,
            files => Value::from_serialize(&self.files),
            selected_key => &self.selected_key,
            selected_notes => &self.selected_notes,
            resolved_path => &self.resolved_path,
            extension => &self.extension,
            content => &self.content,
            form_token => &self.form_token,
            csp_nonce => &self.csp_nonce
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbedFormContext {
    pub embed_path: String,
    pub message: Option<String>,
    pub notices: Vec<String>,
    pub file_name: String,
    pub resolved_path: Option<String>,
    pub extension: String,
    pub content: String,
    pub form_token: Option<String>,
}

impl EmbedFormContext {
    pub fn to_value(&self) -> Value {
        context! {
            embed_path => &self.embed_path,
            message => &self.message,
            notices => &self.notices,
            file_name => &self.file_name,
            resolved_path => &self.resolved_path,
            extension => &self.extension,
            content => &self.content,
            form_token => &self.form_token
        }
    }
}
