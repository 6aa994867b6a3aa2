//! Test harness and store wrappers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use jobdesk::config::Config;
use jobdesk::error::StoreError;
use jobdesk::form::JobForm;
use jobdesk::store::{Document, DocumentStore, DocumentWrite, FieldFilter, MemoryStore};

use super::builders::{fields, user};

/// A `JobForm` over a seeded in-memory store.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub config: Config,
    pub form: JobForm,
}

impl TestHarness {
    /// Two customers and one registered engineer.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(seeded_store());
        let form = JobForm::open(store.clone(), &config).await;
        Self {
            store,
            config,
            form,
        }
    }

    pub fn customer_names(&self) -> Vec<String> {
        self.store
            .documents(&self.config.collections.customers)
            .into_iter()
            .map(|d| d.id)
            .collect()
    }

    pub fn jobs(&self) -> Vec<Document> {
        self.store.documents(&self.config.collections.jobs)
    }
}

pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for name in ["Acme Corp", "Zenith"] {
        store
            .insert("customers", name, fields(json!({ "name": name })))
            .expect("seed customer");
    }
    store
        .insert("users", "u1", user("Asha", "asha@x.io", "engineer", true))
        .expect("seed user");
    store
        .insert("users", "u2", user("Ravi", "ravi@x.io", "engineer", true))
        .expect("seed user");
    store
        .insert("users", "u3", user("Kiran", "kiran@x.io", "engineer", false))
        .expect("seed user");
    store
        .insert("users", "u4", user("Meera", "meera@x.io", "owner", true))
        .expect("seed user");
    store
}

/// Holds the first document write until `release` is called.
///
/// Uses the trait's default (sequential) `commit`.
pub struct GatedStore {
    pub inner: MemoryStore,
    entered: Notify,
    release: Notify,
    gated: AtomicBool,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
            gated: AtomicBool::new(false),
        }
    }

    /// Resolves once the first write is waiting at the gate.
    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.read_collection(collection).await
    }

    async fn read_filtered(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.read_filtered(collection, filters).await
    }

    async fn read_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.read_document(collection, key).await
    }

    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        if !self.gated.swap(true, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.write_document(collection, key, write).await
    }
}

/// Pass-through store without an atomic `commit`, so batches run one
/// operation at a time.
pub struct SequentialStore(pub MemoryStore);

#[async_trait]
impl DocumentStore for SequentialStore {
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.0.read_collection(collection).await
    }

    async fn read_filtered(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError> {
        self.0.read_filtered(collection, filters).await
    }

    async fn read_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.0.read_document(collection, key).await
    }

    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        self.0.write_document(collection, key, write).await
    }
}
