// This file is part of the product ConfEdit.
// SPDX-FileCopyrightText: 2025-2026 ConfEdit Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fs;
use std::io;
use std::path::Path;

/// Filesystem boundary of the editor. Passed explicitly into the processor
/// so request handling never reaches for a shared global handle.
pub trait FileStore: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn is_writable(&self, path: &Path) -> bool;
}

pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn is_writable(&self, path: &Path) -> bool {
        // Append-open probes writability without touching the contents.
        fs::OpenOptions::new().append(true).open(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn test_local_store_round_trip() {
        let fixture = TestFixtureRoot::new_unique("store-roundtrip").unwrap();
        let path = fixture.path().join("config.json");
        let store = LocalFileStore;

        store.write(&path, "{\"a\":1}").unwrap();
        assert_eq!(store.read_to_string(&path).unwrap(), "{\"a\":1}");
        assert!(store.is_writable(&path));
    }

    #[cfg(unix)]
    #[test]
    fn test_local_store_detects_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = TestFixtureRoot::new_unique("store-readonly").unwrap();
        let path = fixture.path().join("frozen.json");
        let store = LocalFileStore;
        store.write(&path, "{}").unwrap();

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o444);
        fs::set_permissions(&path, perms).unwrap();

        assert!(!store.is_writable(&path));
    }
}
