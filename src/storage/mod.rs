// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Resource Storage
//!
//! A uniform CRUD + filter + paginate interface over one persisted collection
//! per resource type, independent of the physical backend.
//!
//! ## Backends
//!
//! - [`FileStore`]: one JSON array file per collection, rewritten atomically
//!   (temp file + rename) under a mutex.
//! - [`RedbStore`]: one redb table per collection keyed by id, plus a
//!   creation-time index table for newest-first scans.
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   users.json          # file backend
//!   properties.json     # file backend
//!   estate.redb         # redb backend (all collections)
//! ```
//!
//! Records are persisted with snake_case field names (see [`schema`]); the
//! API types in [`crate::models`] use camelCase.

use std::{str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Property, User};
use crate::query::{Page, StoreQuery};

pub mod file_store;
pub mod paths;
pub mod redb_store;
pub mod schema;

pub use file_store::FileStore;
pub use paths::StoragePaths;
pub use redb_store::RedbStore;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("{resource} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} already exists: {id}")]
    AlreadyExists { resource: &'static str, id: String },

    #[error("{0}")]
    InvalidPatch(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found<R: Resource>(id: &str) -> Self {
        Self::NotFound {
            resource: R::NAME,
            id: id.to_string(),
        }
    }

    pub fn already_exists<R: Resource>(id: &str) -> Self {
        Self::AlreadyExists {
            resource: R::NAME,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Resource + Store traits
// =============================================================================

/// A persisted resource type and its storage mapping.
pub trait Resource: Clone + Send + Sync + 'static {
    /// snake_case storage representation.
    type Record: Serialize + DeserializeOwned + Send + Sync;
    /// Partial update accepted by [`ResourceStore::update`].
    type Patch: Send + Sync;

    /// Human-readable name used in error messages.
    const NAME: &'static str;
    /// Collection (file stem / table) name.
    const COLLECTION: &'static str;
    /// redb index table keyed by inverted creation time.
    const CREATED_INDEX: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;

    fn to_record(&self) -> Self::Record;
    fn from_record(record: Self::Record) -> Self;

    /// Merge a patch in place, refreshing the modification time.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) -> Result<(), String>;
}

/// CRUD access to one collection.
///
/// Listing always returns items newest-created-first, with `total` counting
/// every item that satisfied the conditions before the window was applied.
pub trait ResourceStore<R: Resource>: Send + Sync {
    fn list(&self, query: &StoreQuery) -> StoreResult<Page<R>>;

    fn get(&self, id: &str) -> StoreResult<Option<R>>;

    /// Persist a new item; fails with [`StoreError::AlreadyExists`] on a
    /// duplicate id. Returns the stored representation.
    fn insert(&self, item: &R) -> StoreResult<R>;

    /// Atomically read, patch and write back one item.
    fn update(&self, id: &str, patch: &R::Patch) -> StoreResult<R>;

    fn delete(&self, id: &str) -> StoreResult<()>;

    /// Verify the backend is reachable and writable.
    fn health_check(&self) -> StoreResult<()>;
}

// =============================================================================
// Backend selection
// =============================================================================

/// Physical storage engine, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    File,
    Redb,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Redb => "redb",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            other => Err(format!("unknown storage backend `{other}` (expected file or redb)")),
        }
    }
}

/// One store per collection, shared by every request.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn ResourceStore<User>>,
    pub properties: Arc<dyn ResourceStore<Property>>,
}

/// Open both collections on the selected backend.
pub fn open_stores(backend: StorageBackend, paths: &StoragePaths) -> StoreResult<Stores> {
    std::fs::create_dir_all(paths.root())?;

    let stores = match backend {
        StorageBackend::File => Stores {
            users: Arc::new(FileStore::<User>::open(paths)?),
            properties: Arc::new(FileStore::<Property>::open(paths)?),
        },
        StorageBackend::Redb => {
            let db = Arc::new(redb::Database::create(paths.redb_file())?);
            Stores {
                users: Arc::new(RedbStore::<User>::open(db.clone())?),
                properties: Arc::new(RedbStore::<Property>::open(db)?),
            }
        }
    };

    tracing::info!(
        backend = backend.as_str(),
        root = %paths.root().display(),
        "Storage opened"
    );
    Ok(stores)
}

// =============================================================================
// Backend conformance suite
// =============================================================================
