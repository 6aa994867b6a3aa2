//! SQLite-backed document store.
//!
//! Documents are JSON bodies in the `documents` table. Server timestamps
//! come from SQLite's own clock, and batches run inside one transaction.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;

use super::{
    Document, DocumentStore, DocumentWrite, FieldFilter, WriteBatch, WriteOp, WriteResult,
};
use crate::db::document_repo::{self, DocumentRow};
use crate::db::{Database, DatabaseError};
use crate::error::StoreError;

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) a store file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs a blocking database call off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Backend(format!("database task failed: {}", e)))?
    }
}

fn to_document(row: DocumentRow) -> Result<Document, StoreError> {
    match serde_json::from_str::<Value>(&row.body)? {
        Value::Object(fields) => Ok(Document::new(row.key, fields)),
        _ => Err(DatabaseError::CorruptDocument {
            collection: row.collection,
            key: row.key,
            reason: "body is not a JSON object".to_string(),
        }
        .into()),
    }
}

fn to_documents(rows: Vec<DocumentRow>) -> Result<Vec<Document>, StoreError> {
    rows.into_iter().map(to_document).collect()
}

fn resolve_body(conn: &Connection, write: &DocumentWrite) -> Result<String, StoreError> {
    let fields = if write.server_timestamps.is_empty() {
        write.fields.clone()
    } else {
        write.resolve(&document_repo::server_now(conn)?)
    };
    Ok(serde_json::to_string(&fields)?)
}

fn apply(conn: &Connection, op: &WriteOp) -> Result<WriteResult, StoreError> {
    match op {
        WriteOp::Set {
            collection,
            key,
            write,
        } => {
            let body = resolve_body(conn, write)?;
            document_repo::upsert(conn, collection, key, &body)?;
            Ok(WriteResult::Written)
        }
        WriteOp::Create {
            collection,
            key,
            write,
        } => {
            if document_repo::exists(conn, collection, key)? {
                return Err(StoreError::AlreadyExists {
                    collection: collection.clone(),
                    key: key.clone(),
                });
            }
            let body = resolve_body(conn, write)?;
            document_repo::insert(conn, collection, key, &body)?;
            Ok(WriteResult::Written)
        }
        WriteOp::CreateIfAbsent {
            collection,
            key,
            write,
        } => {
            if document_repo::exists(conn, collection, key)? {
                return Ok(WriteResult::Skipped);
            }
            let body = resolve_body(conn, write)?;
            document_repo::insert(conn, collection, key, &body)?;
            Ok(WriteResult::Written)
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        self.blocking(move |db| {
            let rows = db.with_conn(|conn| document_repo::list(conn, &collection))?;
            to_documents(rows)
        })
        .await
    }

    async fn read_filtered(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        let filters = filters.to_vec();
        self.blocking(move |db| {
            let pairs: Vec<(&str, &Value)> = filters
                .iter()
                .map(|f| (f.field.as_str(), &f.value))
                .collect();
            let rows =
                db.with_conn(|conn| document_repo::list_filtered(conn, &collection, &pairs))?;
            to_documents(rows)
        })
        .await
    }

    async fn read_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();
        let key = key.to_string();
        self.blocking(move |db| {
            let row = db.with_conn(|conn| document_repo::find(conn, &collection, &key))?;
            row.map(to_document).transpose()
        })
        .await
    }

    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        let op = WriteOp::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            write,
        };
        self.blocking(move |db| db.with_transaction(|tx| apply(tx, &op).map(|_| ())))
            .await
    }

    /// Applies the whole batch in one transaction.
    async fn commit(&self, batch: WriteBatch) -> Result<Vec<WriteResult>, StoreError> {
        self.blocking(move |db| {
            db.with_transaction(|tx| {
                batch
                    .ops()
                    .iter()
                    .map(|op| apply(tx, op))
                    .collect::<Result<Vec<_>, StoreError>>()
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Fields;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let write = DocumentWrite::new(fields(json!({"name": "Acme"})))
            .with_server_timestamp("createdAt");
        store.write_document("customers", "Acme", write).await.unwrap();

        let doc = store
            .read_document("customers", "Acme")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.id, "Acme");
        assert_eq!(doc.get_str("name"), Some("Acme"));
        let created = doc.get_str("createdAt").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.read_document("jobs", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filtered_read() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (key, role, registered) in [
            ("u1", "engineer", true),
            ("u2", "engineer", false),
            ("u3", "coordinator", true),
        ] {
            store
                .write_document(
                    "users",
                    key,
                    DocumentWrite::new(fields(json!({
                        "role": role,
                        "isRegistered": registered,
                    }))),
                )
                .await
                .unwrap();
        }

        let docs = store
            .read_filtered(
                "users",
                &[
                    FieldFilter::equals("role", "engineer"),
                    FieldFilter::equals("isRegistered", true),
                ],
            )
            .await
            .unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["u1"]);
    }

    #[tokio::test]
    async fn test_commit_rolls_back_on_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_document("jobs", "J1", DocumentWrite::new(fields(json!({"v": 1}))))
            .await
            .unwrap();

        let batch = WriteBatch::new()
            .set("customers", "Acme", DocumentWrite::new(fields(json!({"name": "Acme"}))))
            .create("jobs", "J1", DocumentWrite::new(fields(json!({"v": 2}))));
        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        assert!(store.read_collection("customers").await.unwrap().is_empty());
        let job = store.read_document("jobs", "J1").await.unwrap().unwrap();
        assert_eq!(job.fields["v"], 1);
    }

    #[tokio::test]
    async fn test_commit_reports_per_op_results() {
        let store = SqliteStore::open_in_memory().unwrap();
        let customer = || DocumentWrite::new(fields(json!({"name": "Acme"})));

        let first = store
            .commit(WriteBatch::new().create_if_absent("customers", "Acme", customer()))
            .await
            .unwrap();
        let second = store
            .commit(WriteBatch::new().create_if_absent("customers", "Acme", customer()))
            .await
            .unwrap();

        assert_eq!(first, vec![WriteResult::Written]);
        assert_eq!(second, vec![WriteResult::Skipped]);
        assert_eq!(store.read_collection("customers").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobdesk.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .write_document("jobs", "J7", DocumentWrite::new(fields(json!({"jobid": "J7"}))))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let doc = store.read_document("jobs", "J7").await.unwrap();
        assert_eq!(doc.unwrap().get_str("jobid"), Some("J7"));
    }
}
