// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flat-file backend: one JSON array per collection.
//!
//! Every mutation is a read/modify/write of the whole collection, serialized
//! by a mutex and written atomically via temp file + rename.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

use super::{Resource, ResourceStore, StoragePaths, StoreError, StoreResult};
use crate::query::{newest_first, Page, StoreQuery};

pub struct FileStore<R: Resource> {
    path: PathBuf,
    scratch: PathBuf,
    lock: Mutex<()>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> FileStore<R> {
    /// Open the collection file for `R`, creating an empty one if absent.
    pub fn open(paths: &StoragePaths) -> StoreResult<Self> {
        let store = Self {
            path: paths.collection_file(R::COLLECTION),
            scratch: paths.health_check_file(R::COLLECTION),
            lock: Mutex::new(()),
            _resource: PhantomData,
        };

        if !store.path.exists() {
            store.write_records(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_items(&self) -> StoreResult<Vec<R>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let records: Vec<R::Record> = serde_json::from_reader(BufReader::new(file))?;
        Ok(records.into_iter().map(R::from_record).collect())
    }

    fn write_items(&self, items: &[R]) -> StoreResult<()> {
        let records: Vec<R::Record> = items.iter().map(R::to_record).collect();
        self.write_records(&records)
    }

    fn write_records(&self, records: &[R::Record]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

fn position<R: Resource>(items: &[R], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

impl<R: Resource> ResourceStore<R> for FileStore<R> {
    fn list(&self, query: &StoreQuery) -> StoreResult<Page<R>> {
        let items = {
            let _guard = self.guard();
            self.read_items()?
        };

        let mut matching = Vec::new();
        for item in items {
            if !query.conditions.is_empty()
                && !query.matches(&serde_json::to_value(item.to_record())?)
            {
                continue;
            }
            matching.push(item);
        }

        matching.sort_by(|a, b| newest_first((a.created_at(), a.id()), (b.created_at(), b.id())));
        let total = matching.len();

        Ok(Page {
            items: query.window.apply(matching),
            total,
        })
    }

    fn get(&self, id: &str) -> StoreResult<Option<R>> {
        let items = {
            let _guard = self.guard();
            self.read_items()?
        };
        Ok(items.into_iter().find(|item| item.id() == id))
    }

    fn insert(&self, item: &R) -> StoreResult<R> {
        let _guard = self.guard();
        let mut items = self.read_items()?;

        if position(&items, item.id()).is_some() {
            return Err(StoreError::already_exists::<R>(item.id()));
        }

        let stored = R::from_record(item.to_record());
        items.push(stored.clone());
        self.write_items(&items)?;

        tracing::debug!(collection = R::COLLECTION, id = %item.id(), "Record inserted");
        Ok(stored)
    }

    fn update(&self, id: &str, patch: &R::Patch) -> StoreResult<R> {
        let _guard = self.guard();
        let mut items = self.read_items()?;

        let index = position(&items, id).ok_or_else(|| StoreError::not_found::<R>(id))?;
        let mut item = items[index].clone();
        item.apply_patch(patch, Utc::now())
            .map_err(StoreError::InvalidPatch)?;

        items[index] = item.clone();
        self.write_items(&items)?;

        tracing::debug!(collection = R::COLLECTION, id = %id, "Record updated");
        Ok(item)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let mut items = self.read_items()?;

        let index = position(&items, id).ok_or_else(|| StoreError::not_found::<R>(id))?;
        items.remove(index);
        self.write_items(&items)?;

        tracing::debug!(collection = R::COLLECTION, id = %id, "Record deleted");
        Ok(())
    }

    fn health_check(&self) -> StoreResult<()> {
        let _guard = self.guard();
        let data = b"health_check_data";
        fs::write(&self.scratch, data)?;
        let read_back = fs::read(&self.scratch)?;
        fs::remove_file(&self.scratch)?;

        if read_back != data {
            return Err(StoreError::Io(std::io::Error::other(
                "health check data mismatch",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Property, User};
    use crate::storage::conformance;

    fn temp_paths() -> (StoragePaths, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (StoragePaths::new(dir.path()), dir)
    }

    fn users() -> (FileStore<User>, tempfile::TempDir) {
        let (paths, dir) = temp_paths();
        (FileStore::open(&paths).unwrap(), dir)
    }

    fn properties() -> (FileStore<Property>, tempfile::TempDir) {
        let (paths, dir) = temp_paths();
        (FileStore::open(&paths).unwrap(), dir)
    }

    #[test]
    fn open_creates_empty_collection_file() {
        let (store, _dir) = users();
        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.trim(), "[]");
        assert!(store.path().ends_with("users.json"));
    }

    #[test]
    fn insert_then_get_round_trips() {
        let (store, _dir) = users();
        conformance::insert_then_get_round_trips(&store);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let (store, _dir) = users();
        conformance::duplicate_id_is_rejected(&store);
    }

    #[test]
    fn list_orders_newest_first_and_windows() {
        let (store, _dir) = users();
        conformance::list_orders_newest_first_and_windows(&store);
    }

    #[test]
    fn exact_conditions_use_storage_field_names() {
        let (store, _dir) = properties();
        conformance::exact_conditions_use_storage_field_names(&store);
    }

    #[test]
    fn update_merges_and_persists() {
        let (store, _dir) = users();
        conformance::update_merges_and_persists(&store);
    }

    #[test]
    fn rejected_patch_leaves_record_untouched() {
        let (store, _dir) = properties();
        conformance::rejected_patch_leaves_record_untouched(&store);
    }

    #[test]
    fn delete_removes_from_lists() {
        let (store, _dir) = users();
        conformance::delete_removes_from_lists(&store);
    }

    #[test]
    fn data_survives_reopen() {
        let (paths, _dir) = temp_paths();
        let user = conformance::user("u-1", "0xabc", 0);
        {
            let store = FileStore::<User>::open(&paths).unwrap();
            store.insert(&user).unwrap();
        }

        let reopened = FileStore::<User>::open(&paths).unwrap();
        assert_eq!(reopened.get("u-1").unwrap(), Some(user));
    }

    #[test]
    fn file_uses_snake_case_records() {
        let (store, _dir) = properties();
        store
            .insert(&conformance::property("p-1", crate::models::PropertyStatus::Active, 0))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["total_shares"], 100);
        assert_eq!(raw[0]["owner_address"], "0xowner");
    }

    #[test]
    fn health_check_leaves_no_scratch_file() {
        let (paths, _dir) = temp_paths();
        let store = FileStore::<User>::open(&paths).unwrap();
        store.health_check().unwrap();
        assert!(!paths.health_check_file("users").exists());
    }

    #[test]
    fn concurrent_health_checks_do_not_collide() {
        let (paths, _dir) = temp_paths();
        let users = std::sync::Arc::new(FileStore::<User>::open(&paths).unwrap());
        let properties = std::sync::Arc::new(FileStore::<Property>::open(&paths).unwrap());

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let users = users.clone();
                let properties = properties.clone();
                std::thread::spawn(move || {
                    for round in 0..100 {
                        if (worker + round) % 2 == 0 {
                            users.health_check().unwrap();
                        } else {
                            properties.health_check().unwrap();
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
    }
}
