// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::GateConfig,
    models::{Property, User},
    storage::{ResourceStore, Stores},
};

/// Shared handler state. Stores are the only state that outlives a request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn ResourceStore<User>>,
    pub properties: Arc<dyn ResourceStore<Property>>,
    pub gate: Arc<GateConfig>,
}

impl AppState {
    pub fn new(stores: Stores, gate: GateConfig) -> Self {
        Self {
            users: stores.users,
            properties: stores.properties,
            gate: Arc::new(gate),
        }
    }
}

impl FromRef<AppState> for Arc<GateConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

#[cfg(test)]
impl AppState {
    /// File-backed state rooted in a temporary directory.
    pub fn for_tests() -> (Self, tempfile::TempDir) {
        use crate::storage::{open_stores, StorageBackend, StoragePaths};

        let dir = tempfile::tempdir().expect("tempdir");
        let stores = open_stores(StorageBackend::File, &StoragePaths::new(dir.path()))
            .expect("open stores");
        (Self::new(stores, GateConfig::default()), dir)
    }
}
