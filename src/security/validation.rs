// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub const MAX_KEY_CHARS: usize = 64;

/// Normalize a registry key: lowercase ASCII letters, digits, dashes and
/// underscores survive, everything else is dropped. An over-long or fully
/// invalid key normalizes to the empty string and is rejected by callers.
pub fn sanitize_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_ascii_lowercase())
            } else {
                None
            }
        })
        .collect();

    if sanitized.len() > MAX_KEY_CHARS {
        return String::new();
    }
    sanitized
}

/// Reduce user-supplied input to a bare file name for the embed surface.
/// Path separators, traversal components, hidden-file prefixes and control
/// characters are rejected by returning an empty string.
pub fn sanitize_file_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 255 {
        return String::new();
    }

    // URL decode first to catch encoded traversal attempts.
    let decoded = match urlencoding::decode(trimmed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return String::new(),
    };

    if decoded.contains('/') || decoded.contains('\\') || decoded.contains("..") {
        return String::new();
    }
    if decoded.starts_with('.') {
        return String::new();
    }
    if decoded.chars().any(|c| c.is_control()) {
        return String::new();
    }

    decoded
}
