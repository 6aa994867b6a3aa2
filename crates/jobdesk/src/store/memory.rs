//! In-memory document store.
//!
//! Collections live in ordered maps behind a `RwLock`. Supports a custom
//! clock and injected per-collection failures so the intake flow can be
//! exercised without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use super::{
    Document, DocumentStore, DocumentWrite, FieldFilter, Fields, WriteBatch, WriteOp, WriteResult,
};
use crate::error::StoreError;

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;
type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Which operations an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Reads,
    Writes,
    All,
}

impl FailureMode {
    fn blocks_reads(self) -> bool {
        matches!(self, FailureMode::Reads | FailureMode::All)
    }

    fn blocks_writes(self) -> bool {
        matches!(self, FailureMode::Writes | FailureMode::All)
    }
}

pub struct MemoryStore {
    collections: RwLock<Collections>,
    failures: RwLock<HashMap<String, FailureMode>>,
    clock: Clock,
    writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Creates a store whose server timestamps come from `clock`.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            collections: RwLock::new(BTreeMap::new()),
            failures: RwLock::new(HashMap::new()),
            clock: Box::new(clock),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seeds a document directly, bypassing failure injection and the write counter.
    pub fn insert(&self, collection: &str, key: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);
        Ok(())
    }

    /// Makes subsequent operations on `collection` fail.
    pub fn fail_collection(&self, collection: &str, mode: FailureMode) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(collection.to_string(), mode);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    /// Number of documents written through the store interface.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a collection, ordered by key.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .map(|c| snapshot(&c, collection, &[]))
            .unwrap_or_default()
    }

    fn now(&self) -> String {
        (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn check(&self, collection: &str, write: bool) -> Result<(), StoreError> {
        let failures = self.failures.read().map_err(|_| StoreError::LockPoisoned)?;
        match failures.get(collection) {
            Some(mode) if write && mode.blocks_writes() => Err(StoreError::Backend(format!(
                "write to '{}' rejected",
                collection
            ))),
            Some(mode) if !write && mode.blocks_reads() => Err(StoreError::Backend(format!(
                "read from '{}' rejected",
                collection
            ))),
            _ => Ok(()),
        }
    }
}

fn snapshot(collections: &Collections, collection: &str, filters: &[FieldFilter]) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, fields)| filters.iter().all(|f| f.matches(fields)))
                .map(|(key, fields)| Document::new(key.clone(), fields.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn apply(collections: &mut Collections, op: WriteOp, now: &str) -> Result<WriteResult, StoreError> {
    let (collection, key, write, on_existing) = match op {
        WriteOp::Set {
            collection,
            key,
            write,
        } => (collection, key, write, None),
        WriteOp::Create {
            collection,
            key,
            write,
        } => (collection, key, write, Some(true)),
        WriteOp::CreateIfAbsent {
            collection,
            key,
            write,
        } => (collection, key, write, Some(false)),
    };

    let docs = collections.entry(collection.clone()).or_default();
    match on_existing {
        Some(fail) if docs.contains_key(&key) => {
            if fail {
                Err(StoreError::AlreadyExists { collection, key })
            } else {
                Ok(WriteResult::Skipped)
            }
        }
        _ => {
            docs.insert(key, write.resolve(now));
            Ok(WriteResult::Written)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.read_filtered(collection, &[]).await
    }

    async fn read_filtered(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError> {
        self.check(collection, false)?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(snapshot(&collections, collection, filters))
    }

    async fn read_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check(collection, false)?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|fields| Document::new(key, fields.clone())))
    }

    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        self.check(collection, true)?;
        let now = self.now();
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), write.resolve(&now));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Applies the whole batch or nothing.
    async fn commit(&self, batch: WriteBatch) -> Result<Vec<WriteResult>, StoreError> {
        for op in batch.ops() {
            self.check(op.collection(), true)?;
        }

        let now = self.now();
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut staged = collections.clone();

        let mut results = Vec::with_capacity(batch.len());
        for op in batch {
            results.push(apply(&mut staged, op, &now)?);
        }

        *collections = staged;
        let written = results
            .iter()
            .filter(|r| **r == WriteResult::Written)
            .count();
        self.writes.fetch_add(written, Ordering::SeqCst);
        Ok(results)
    }
}
