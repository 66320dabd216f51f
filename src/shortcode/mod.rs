// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1},
    combinator::{map, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
};
use std::collections::HashMap;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::editor::{self, EMBED_SAVE_SCOPE, Principal, Submission};
use crate::locator::locate;
use crate::security::sanitize_file_name;
use crate::templates::{EmbedFormContext, render_minijinja_template};
use crate::util::FormTokenStore;

pub const CONFIG_EDITOR_TAG: &str = "config-editor";
pub const EMBED_PATH: &str = "/embed/config-editor";

/// Represents a parsed embed tag with its name and attributes
#[derive(Debug, Clone)]
pub struct Shortcode {
    pub name: String,
    pub attributes: HashMap<String, String>,
}

impl Shortcode {
    pub fn config_editor(filename: Option<String>) -> Self {
        let mut attributes = HashMap::new();
        if let Some(filename) = filename {
            attributes.insert("filename".to_string(), filename);
        }
        Shortcode {
            name: CONFIG_EDITOR_TAG.to_string(),
            attributes,
        }
    }
}

pub struct ShortcodeContext<'a> {
    pub config: &'a ValidatedConfig,
    pub app_state: &'a AppState,
    pub tokens: &'a FormTokenStore,
    pub principal: &'a Principal,
}

/// Render the config editor tag as an inline HTML fragment.
///
/// The permission gate runs before anything is read: a viewer without the
/// manage permission gets a notice and never sees file content. Saving goes
/// through the shared processor with the fixed embed token scope.
pub fn handle_config_editor_shortcode(
    shortcode: &Shortcode,
    ctx: &ShortcodeContext<'_>,
    submission: Option<Submission<'_>>,
) -> Result<String, String> {
    if shortcode.name != CONFIG_EDITOR_TAG {
        return Err(format!("Unknown embed tag '{}'", shortcode.name));
    }

    if !ctx.principal.can_manage {
        return Ok(
            "<p>You do not have sufficient permissions to view or edit this configuration.</p>"
                .to_string(),
        );
    }

    let file_name = match shortcode.attributes.get("filename") {
        Some(raw) => {
            let sanitized = sanitize_file_name(raw);
            if sanitized.is_empty() {
                return Err(format!("Rejected embed file name '{}'", raw));
            }
            sanitized
        }
        None => ctx.config.editor.default_file.clone(),
    };

    let located = locate(&ctx.app_state.runtime_paths.active_theme_dir, &file_name);
    let outcome = editor::process(
        ctx.app_state.acquire_store(),
        ctx.tokens,
        &located,
        EMBED_SAVE_SCOPE,
        submission,
        ctx.principal,
    );

    let form_token = match (&outcome.resolved_path, &ctx.principal.session_id) {
        (Some(_), Some(session_id)) => Some(ctx.tokens.issue(session_id, EMBED_SAVE_SCOPE)),
        _ => None,
    };

    let context = EmbedFormContext {
        embed_path: EMBED_PATH.to_string(),
        message: outcome.message.clone(),
        notices: outcome.notice_messages(),
        file_name,
        resolved_path: outcome
            .resolved_path
            .as_ref()
            .map(|path| path.display().to_string()),
        extension: outcome.extension.clone(),
        content: outcome.content.clone(),
        form_token,
    }
    .to_value();

    render_minijinja_template(
        ctx.app_state.templates.as_ref(),
        "shortcode/editor_form.html",
        context,
    )
    .map_err(|err| {
        log::error!("Failed to render embed form template: {}", err);
        format!("Failed to render embed form: {}", err)
    })
}

// Nom parser implementation for embed tags, delimited by (( and )).

// Parse tag name: alphanumeric with hyphens and underscores
fn shortcode_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"), tag("-"))),
        many0(alt((alphanumeric1, tag("-"), tag("_")))),
    ))(input)
}

// Parse quoted string value
fn quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

// Parse unquoted value (simple strings without spaces)
fn unquoted_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ')')(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((quoted_value, unquoted_value))(input)
}

// Parse single attribute: key="value", key=value, or a standalone flag
fn attribute(input: &str) -> IResult<&str, (String, String)> {
    alt((
        map(
            separated_pair(
                shortcode_name,
                delimited(multispace0, char('='), multispace0),
                attribute_value,
            ),
            |(k, v)| (k.to_string(), v.to_string()),
        ),
        map(shortcode_name, |k| (k.to_string(), String::new())),
    ))(input)
}

fn shortcode_content(input: &str) -> IResult<&str, Shortcode> {
    map(
        tuple((
            preceded(multispace0, shortcode_name),
            many0(preceded(multispace1, attribute)),
            multispace0,
        )),
        |(name, attrs, _)| Shortcode {
            name: name.to_string(),
            attributes: attrs.into_iter().collect(),
        },
    )(input)
}

fn nom_parse_shortcode(input: &str) -> IResult<&str, Shortcode> {
    delimited(tag("(("), shortcode_content, tag("))"))(input)
}

/// Parse an embed tag from text starting at the beginning.
/// Returns (Shortcode, consumed_bytes) if successful.
pub fn parse_shortcode(text: &str) -> Option<(Shortcode, usize)> {
    match nom_parse_shortcode(text) {
        Ok((remaining, shortcode)) => {
            let consumed = text.len() - remaining.len();
            Some((shortcode, consumed))
        }
        Err(_) => None,
    }
}
