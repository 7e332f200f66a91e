// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded backend backed by redb (pure Rust, ACID).
//!
//! ## Table Layout (per collection)
//!
//! - `<collection>`: id → serialized storage record (JSON bytes)
//! - `<collection>_by_created`: `!created_at_nanos_be | id` → id
//!
//! The inverted timestamp makes a forward scan of the index newest-first;
//! equal timestamps fall back to ascending id order.

use std::{marker::PhantomData, sync::Arc};

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{Resource, ResourceStore, StoreError, StoreResult};
use crate::query::{Page, StoreQuery};

// =============================================================================
// Table Definitions
// =============================================================================

fn records_table<R: Resource>() -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(R::COLLECTION)
}

fn created_index<R: Resource>() -> TableDefinition<'static, &'static [u8], &'static str> {
    TableDefinition::new(R::CREATED_INDEX)
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build the creation-index key: `inverted_timestamp_be_bytes | id`.
fn make_index_key(created_at: DateTime<Utc>, id: &str) -> Vec<u8> {
    let nanos = created_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| created_at.timestamp_micros().saturating_mul(1_000));
    // Flip the sign bit so negative timestamps order correctly, then invert.
    let ordered = !((nanos as u64) ^ (1 << 63));

    let mut key = Vec::with_capacity(8 + id.len());
    key.extend_from_slice(&ordered.to_be_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}

// =============================================================================
// RedbStore
// =============================================================================

/// One collection inside a shared redb database.
pub struct RedbStore<R: Resource> {
    db: Arc<Database>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RedbStore<R> {
    /// Attach to a database, creating this collection's tables if needed.
    pub fn open(db: Arc<Database>) -> StoreResult<Self> {
        // Pre-create tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(records_table::<R>())?;
            let _ = write_txn.open_table(created_index::<R>())?;
        }
        write_txn.commit()?;

        Ok(Self {
            db,
            _resource: PhantomData,
        })
    }

    fn decode(bytes: &[u8]) -> StoreResult<R> {
        let record: R::Record = serde_json::from_slice(bytes)?;
        Ok(R::from_record(record))
    }
}

impl<R: Resource> ResourceStore<R> for RedbStore<R> {
    fn list(&self, query: &StoreQuery) -> StoreResult<Page<R>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(created_index::<R>())?;
        let records = read_txn.open_table(records_table::<R>())?;

        let mut items = Vec::new();
        let mut total = 0usize;

        for entry in index.iter()? {
            let (_, id) = entry?;
            let Some(value) = records.get(id.value())? else {
                tracing::warn!(
                    collection = R::COLLECTION,
                    id = %id.value(),
                    "Index entry without record"
                );
                continue;
            };

            if !query.conditions.is_empty() {
                let raw: serde_json::Value = serde_json::from_slice(value.value())?;
                if !query.matches(&raw) {
                    continue;
                }
            }

            if query.window.contains(total) {
                items.push(Self::decode(value.value())?);
            }
            total += 1;
        }

        Ok(Page { items, total })
    }

    fn get(&self, id: &str) -> StoreResult<Option<R>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(records_table::<R>())?;
        match table.get(id)? {
            Some(value) => Ok(Some(Self::decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, item: &R) -> StoreResult<R> {
        let json = serde_json::to_vec(&item.to_record())?;

        let write_txn = self.db.begin_write()?;
        {
            let mut records = write_txn.open_table(records_table::<R>())?;
            if records.get(item.id())?.is_some() {
                return Err(StoreError::already_exists::<R>(item.id()));
            }
            records.insert(item.id(), json.as_slice())?;

            let mut index = write_txn.open_table(created_index::<R>())?;
            let key = make_index_key(item.created_at(), item.id());
            index.insert(key.as_slice(), item.id())?;
        }
        write_txn.commit()?;

        tracing::debug!(collection = R::COLLECTION, id = %item.id(), "Record inserted");
        Self::decode(&json)
    }

    fn update(&self, id: &str, patch: &R::Patch) -> StoreResult<R> {
        let write_txn = self.db.begin_write()?;
        let item = {
            let mut table = write_txn.open_table(records_table::<R>())?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| StoreError::not_found::<R>(id))?;
                existing.value().to_vec()
            };

            let mut item = Self::decode(&existing_bytes)?;
            item.apply_patch(patch, Utc::now())
                .map_err(StoreError::InvalidPatch)?;

            let json = serde_json::to_vec(&item.to_record())?;
            table.insert(id, json.as_slice())?;
            item
        };
        write_txn.commit()?;

        tracing::debug!(collection = R::COLLECTION, id = %id, "Record updated");
        Ok(item)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(records_table::<R>())?;
            let removed = table
                .remove(id)?
                .ok_or_else(|| StoreError::not_found::<R>(id))?;
            let item = Self::decode(removed.value())?;
            drop(removed);

            let mut index = write_txn.open_table(created_index::<R>())?;
            index.remove(make_index_key(item.created_at(), id).as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(collection = R::COLLECTION, id = %id, "Record deleted");
        Ok(())
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(records_table::<R>())?;
        let _ = read_txn.open_table(created_index::<R>())?;

        // Writable: open the tables for writing, then roll back.
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(records_table::<R>())?;
            let _ = write_txn.open_table(created_index::<R>())?;
        }
        write_txn.abort()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
