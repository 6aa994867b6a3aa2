//! Document store abstraction.
//!
//! The intake flow only ever needs four primitives against a
//! collection/key document database, plus an ordered batch. Backends:
//! [`MemoryStore`] for tests and embedding, [`SqliteStore`] for a
//! persistent file.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Top-level fields of a document.
pub type Fields = Map<String, Value>;

/// A document read back from a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns a top-level string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Decodes the fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        match fields.get(&self.field) {
            Some(v) => *v == self.value,
            None => self.value.is_null(),
        }
    }
}

/// A full-document write.
///
/// Fields listed in `server_timestamps` are stamped by the store with its
/// own clock when the write is applied, overriding anything in `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub fields: Fields,
    pub server_timestamps: Vec<String>,
}

impl DocumentWrite {
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    /// Serializes a record into a write. The record must encode as a JSON object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(StoreError::Backend(format!(
                "record did not encode as an object: {}",
                other
            ))),
        }
    }

    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    /// Produces the final field map using `now` for server timestamps.
    pub fn resolve(&self, now: &str) -> Fields {
        let mut fields = self.fields.clone();
        for field in &self.server_timestamps {
            fields.insert(field.clone(), Value::String(now.to_string()));
        }
        fields
    }
}

/// One operation of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the document, creating it if absent.
    Set {
        collection: String,
        key: String,
        write: DocumentWrite,
    },
    /// Create the document; fail with [`StoreError::AlreadyExists`] if present.
    Create {
        collection: String,
        key: String,
        write: DocumentWrite,
    },
    /// Create the document only if absent; leave an existing one untouched.
    CreateIfAbsent {
        collection: String,
        key: String,
        write: DocumentWrite,
    },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Create { collection, .. }
            | WriteOp::CreateIfAbsent { collection, .. } => collection,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            WriteOp::Set { key, .. }
            | WriteOp::Create { key, .. }
            | WriteOp::CreateIfAbsent { key, .. } => key,
        }
    }
}

/// Per-operation result of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// `CreateIfAbsent` found an existing document.
    Skipped,
}

/// Ordered list of writes applied by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, collection: &str, key: &str, write: DocumentWrite) -> Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            write,
        });
        self
    }

    pub fn create(mut self, collection: &str, key: &str, write: DocumentWrite) -> Self {
        self.ops.push(WriteOp::Create {
            collection: collection.to_string(),
            key: key.to_string(),
            write,
        });
        self
    }

    pub fn create_if_absent(mut self, collection: &str, key: &str, write: DocumentWrite) -> Self {
        self.ops.push(WriteOp::CreateIfAbsent {
            collection: collection.to_string(),
            key: key.to_string(),
            write,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Capability interface over a collection/key document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, ordered by key.
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Documents whose fields match all filters, ordered by key.
    async fn read_filtered(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError>;

    async fn read_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Replaces the document at `collection/key` (no field merge).
    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        write: DocumentWrite,
    ) -> Result<(), StoreError>;

    /// Applies `batch` in order.
    ///
    /// The default implementation is not atomic: it runs each operation
    /// through the primitives above and, if an operation after the first
    /// fails, reports [`StoreError::PartialCommit`] with the number of
    /// operations that are already durable.
    async fn commit(&self, batch: WriteBatch) -> Result<Vec<WriteResult>, StoreError> {
        let mut results = Vec::with_capacity(batch.len());
        for op in batch {
            let applied = results.len();
            match apply_sequential(self, op).await {
                Ok(result) => results.push(result),
                Err(e) if applied == 0 => return Err(e),
                Err(e) => {
                    return Err(StoreError::PartialCommit {
                        applied,
                        source: Box::new(e),
                    })
                }
            }
        }
        Ok(results)
    }
}

async fn apply_sequential<S: DocumentStore + ?Sized>(
    store: &S,
    op: WriteOp,
) -> Result<WriteResult, StoreError> {
    match op {
        WriteOp::Set {
            collection,
            key,
            write,
        } => {
            store.write_document(&collection, &key, write).await?;
            Ok(WriteResult::Written)
        }
        WriteOp::Create {
            collection,
            key,
            write,
        } => {
            if store.read_document(&collection, &key).await?.is_some() {
                return Err(StoreError::AlreadyExists { collection, key });
            }
            store.write_document(&collection, &key, write).await?;
            Ok(WriteResult::Written)
        }
        WriteOp::CreateIfAbsent {
            collection,
            key,
            write,
        } => {
            if store.read_document(&collection, &key).await?.is_some() {
                return Ok(WriteResult::Skipped);
            }
            store.write_document(&collection, &key, write).await?;
            Ok(WriteResult::Written)
        }
    }
}
