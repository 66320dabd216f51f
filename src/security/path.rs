// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum PathCheckError {
    /// The target (or the base directory) could not be canonicalized.
    NotFound,
    /// The canonical target lies outside the canonical base directory.
    OutsideBase,
}

impl fmt::Display for PathCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCheckError::NotFound => write!(f, "path could not be resolved"),
            PathCheckError::OutsideBase => write!(f, "path is outside the permitted directory"),
        }
    }
}

/// Validates that a file path is within the allowed base directory after canonicalization.
/// Returns Ok(canonical_path) if valid, or Err describing why it was rejected.
pub fn canonical_path_within(
    file_path: &Path,
    base_dir: &Path,
) -> Result<PathBuf, PathCheckError> {
    let canonical_file_path = match file_path.canonicalize() {
        Ok(path) => path,
        Err(_) => return Err(PathCheckError::NotFound),
    };

    let canonical_base_dir = match base_dir.canonicalize() {
        Ok(path) => path,
        Err(_) => return Err(PathCheckError::NotFound),
    };

    // strip_prefix returns Ok(remaining_path) if canonical_file_path is within
    // canonical_base_dir, or Err if it resolved outside the allowed directory.
    match canonical_file_path.strip_prefix(&canonical_base_dir) {
        Ok(remaining_path) => {
            // Even after canonicalization, be extra paranoid about the remaining path
            let remaining_str = remaining_path.to_string_lossy();
            if remaining_str.contains("..") || Path::new(remaining_str.as_ref()).is_absolute() {
                warn!(
                    "🚨 SECURITY: Suspicious remaining path after strip_prefix: {}",
                    remaining_str
                );
                return Err(PathCheckError::OutsideBase);
            }

            Ok(canonical_file_path)
        }
        Err(_) => {
            warn!(
                "🚨 SECURITY: Path traversal attempt - file outside base directory: {:?} not in {:?}",
                canonical_file_path, canonical_base_dir
            );
            Err(PathCheckError::OutsideBase)
        }
    }
}
