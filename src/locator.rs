// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::path::{Path, PathBuf};

use crate::security::{PathCheckError, canonical_path_within};

/// Outcome of resolving a logical file name against the active theme directory.
#[derive(Debug, Clone)]
pub enum Located {
    Found {
        path: PathBuf,
        extension: String,
    },
    /// The file does not exist at the probed location.
    Missing {
        name: String,
        probed: PathBuf,
    },
    /// The file exists but resolves outside the active theme directory.
    Unsafe {
        name: String,
    },
}

impl Located {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Located::Found { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Resolve `name` inside `theme_dir`. Any embedded occurrence of the theme
/// directory itself is stripped first, so both bare names and full paths
/// produced by older registrations resolve to the same target. The resolved
/// path is only trusted after canonicalization proves it stays inside the
/// theme directory.
pub fn locate(theme_dir: &Path, name: &str) -> Located {
    let theme_dir_str = theme_dir.to_string_lossy();
    let stripped = name.replace(theme_dir_str.as_ref(), "");
    let relative = stripped.trim_start_matches('/');

    let candidate = theme_dir.join(relative);
    if !candidate.exists() {
        warn!(
            "Config file not found at: {}",
            candidate.display()
        );
        return Located::Missing {
            name: display_name(name),
            probed: candidate,
        };
    }

    match canonical_path_within(&candidate, theme_dir) {
        Ok(canonical) => {
            let extension = canonical
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            Located::Found {
                path: canonical,
                extension,
            }
        }
        Err(PathCheckError::NotFound) => Located::Missing {
            name: display_name(name),
            probed: candidate,
        },
        Err(PathCheckError::OutsideBase) => Located::Unsafe {
            name: display_name(name),
        },
    }
}

/// Resolve a registered entry's absolute path through the same checks.
pub fn locate_registered(theme_dir: &Path, path: &Path) -> Located {
    locate(theme_dir, &path.to_string_lossy())
}

fn display_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    #[test]
    fn test_locate_bare_name() {
        let fixture = TestFixtureRoot::new_unique("locator-bare").unwrap();
        fixture.init_theme_layout().unwrap();
        let theme_dir = fixture.active_theme_dir();
        fs::write(theme_dir.join("section-config.json"), "{}").unwrap();

        match locate(&theme_dir, "section-config.json") {
            Located::Found { path, extension } => {
                assert_eq!(extension, "json");
                assert!(path.starts_with(theme_dir.canonicalize().unwrap()));
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_strips_theme_dir_prefix() {
        let fixture = TestFixtureRoot::new_unique("locator-strip").unwrap();
        fixture.init_theme_layout().unwrap();
        let theme_dir = fixture.active_theme_dir();
        fs::write(theme_dir.join("notes.txt"), "hello").unwrap();

        let full = theme_dir.join("notes.txt");
        match locate(&theme_dir, &full.to_string_lossy()) {
            Located::Found { extension, .. } => assert_eq!(extension, "txt"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_missing_file() {
        let fixture = TestFixtureRoot::new_unique("locator-missing").unwrap();
        fixture.init_theme_layout().unwrap();
        let theme_dir = fixture.active_theme_dir();

        match locate(&theme_dir, "absent.json") {
            Located::Missing { name, probed } => {
                assert_eq!(name, "absent.json");
                assert_eq!(probed, theme_dir.join("absent.json"));
            }
            other => panic!("expected Missing, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_rejects_escape() {
        let fixture = TestFixtureRoot::new_unique("locator-escape").unwrap();
        fixture.init_theme_layout().unwrap();
        let theme_dir = fixture.active_theme_dir();
        fs::write(fixture.path().join("outside.json"), "{}").unwrap();

        match locate(&theme_dir, "../outside.json") {
            Located::Unsafe { name } => assert_eq!(name, "outside.json"),
            other => panic!("expected Unsafe, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_is_lowercased() {
        let fixture = TestFixtureRoot::new_unique("locator-ext").unwrap();
        fixture.init_theme_layout().unwrap();
        let theme_dir = fixture.active_theme_dir();
        fs::write(theme_dir.join("LEGACY.JSON"), "{}").unwrap();

        match locate(&theme_dir, "LEGACY.JSON") {
            Located::Found { extension, .. } => assert_eq!(extension, "json"),
            other => panic!("expected Found, got {:?}", other),
        }
    }
}
