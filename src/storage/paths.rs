// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the storage layout under `DATA_DIR`.

use std::path::{Path, PathBuf};

/// Default storage root, relative to the working directory.
pub const DATA_ROOT: &str = "./data";

/// File name of the redb database holding every collection.
pub const REDB_FILE: &str = "estate.redb";

#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// JSON array file backing one collection (file backend).
    pub fn collection_file(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    /// Embedded database file (redb backend).
    pub fn redb_file(&self) -> PathBuf {
        self.root.join(REDB_FILE)
    }

    /// Scratch file used by one collection's write/read/delete health check.
    pub fn health_check_file(&self, collection: &str) -> PathBuf {
        self.root.join(format!(".health_check_{collection}"))
    }
}
