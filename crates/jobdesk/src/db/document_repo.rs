//! Document repository: CRUD operations for the `documents` table.
//!
//! Every function takes a plain `&Connection` so the same calls work
//! both through [`super::Database::with_conn`] and inside a transaction.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::DatabaseError;

const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// A raw document row from the database.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub collection: String,
    pub key: String,
    /// JSON object text.
    pub body: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            collection: row.get("collection")?,
            key: row.get("key")?,
            body: row.get("body")?,
        })
    }
}

/// Returns the database clock as an RFC 3339 UTC string.
pub fn server_now(conn: &Connection) -> Result<String, DatabaseError> {
    let now: String = conn.query_row(&format!("SELECT {}", NOW_SQL), [], |r| r.get(0))?;
    Ok(now)
}

/// Inserts or fully replaces a document body.
pub fn upsert(
    conn: &Connection,
    collection: &str,
    key: &str,
    body: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO documents (collection, key, body, updated_at)
             VALUES (?1, ?2, ?3, {now})
             ON CONFLICT (collection, key)
             DO UPDATE SET body = excluded.body, updated_at = {now}",
            now = NOW_SQL
        ),
        params![collection, key, body],
    )?;
    Ok(())
}

/// Inserts a new document. Fails with a constraint error if the key exists.
pub fn insert(
    conn: &Connection,
    collection: &str,
    key: &str,
    body: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (collection, key, body) VALUES (?1, ?2, ?3)",
        params![collection, key, body],
    )?;
    Ok(())
}

/// Returns true if a document exists at `collection/key`.
pub fn exists(conn: &Connection, collection: &str, key: &str) -> Result<bool, DatabaseError> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1 AND key = ?2)",
        params![collection, key],
        |r| r.get(0),
    )?;
    Ok(found)
}

/// Finds a document by collection and key.
pub fn find(
    conn: &Connection,
    collection: &str,
    key: &str,
) -> Result<Option<DocumentRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT collection, key, body FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection, key],
            DocumentRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Lists every document of a collection ordered by key.
pub fn list(conn: &Connection, collection: &str) -> Result<Vec<DocumentRow>, DatabaseError> {
    list_filtered(conn, collection, &[])
}

/// Lists documents of a collection whose top-level fields equal the given
/// values (all filters must match), ordered by key.
///
/// Matching is by JSON type as well as value: `true` does not match `1`
/// and `"1"` does not match `1`. A `null` filter matches both an explicit
/// `null` and a missing field.
pub fn list_filtered(
    conn: &Connection,
    collection: &str,
    filters: &[(&str, &Value)],
) -> Result<Vec<DocumentRow>, DatabaseError> {
    let mut conditions = vec!["collection = ?1".to_string()];
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(collection.to_string())];

    for (field, value) in filters {
        if !is_valid_field(field) {
            return Err(DatabaseError::InvalidField(field.to_string()));
        }
        let extract = format!("json_extract(body, '$.{}')", field);
        let json_type = format!("json_type(body, '$.{}')", field);
        let condition = match value {
            Value::Null => format!("{} IS NULL", extract),
            Value::Bool(true) => format!("{} = 'true'", json_type),
            Value::Bool(false) => format!("{} = 'false'", json_type),
            Value::Number(n) => {
                match n.as_i64() {
                    Some(i) => param_values.push(Box::new(i)),
                    None => param_values.push(Box::new(n.as_f64().unwrap_or_default())),
                }
                format!(
                    "{} IN ('integer', 'real') AND {} = ?{}",
                    json_type,
                    extract,
                    param_values.len()
                )
            }
            Value::String(text) => {
                param_values.push(Box::new(text.clone()));
                format!("{} = 'text' AND {} = ?{}", json_type, extract, param_values.len())
            }
            // json_extract yields minified JSON text for containers.
            Value::Array(_) | Value::Object(_) => {
                let kind = if value.is_array() { "array" } else { "object" };
                param_values.push(Box::new(value.to_string()));
                format!(
                    "{} = '{}' AND {} = json(?{})",
                    json_type,
                    kind,
                    extract,
                    param_values.len()
                )
            }
        };
        conditions.push(condition);
    }

    let sql = format!(
        "SELECT collection, key, body FROM documents
         WHERE {} ORDER BY key",
        conditions.join(" AND ")
    );

    let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_ref.as_slice(), DocumentRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn is_valid_field(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
