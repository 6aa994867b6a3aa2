//! Versioned layout of the document table.
//!
//! Applied steps are recorded in `_migrations`. Every pending step runs in
//! its own transaction together with its bookkeeping row, so a failed step
//! leaves no trace and is retried on the next open.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};

use super::error::DatabaseError;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
    /// Column the step adds. The SQL is not run when it already exists.
    adds_column: Option<(&'static str, &'static str)>,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "create_documents_table",
        sql: include_str!("sql/001_create_documents.sql"),
        adds_column: None,
    },
    SchemaStep {
        version: 2,
        name: "add_updated_at_to_documents",
        sql: include_str!("sql/002_add_updated_at.sql"),
        adds_column: Some(("documents", "updated_at")),
    },
];

const BOOKKEEPING: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);";

/// Brings `conn` up to the latest layout.
pub fn run_all(conn: &mut Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(BOOKKEEPING)?;
    let applied = applied_versions(conn)?;

    for step in STEPS.iter().filter(|s| !applied.contains(&s.version)) {
        let tx = conn.transaction()?;

        let skip = match step.adds_column {
            Some((table, column)) => has_column(&tx, table, column)?,
            None => false,
        };
        if skip {
            log::info!("Schema step {} ({}) already in place", step.version, step.name);
        } else {
            log::info!("Applying schema step {} ({})", step.version, step.name);
            tx.execute_batch(step.sql)
                .map_err(|source| DatabaseError::Migration {
                    version: step.version,
                    name: step.name,
                    source,
                })?;
        }

        tx.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            params![step.version, step.name],
        )?;
        tx.commit()?;
    }

    Ok(())
}

/// Highest applied step, 0 for a fresh file.
pub fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM _migrations", [], |r| r.get(0))?;
    Ok(version.unwrap_or(0))
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT version FROM _migrations")?;
    let versions = stmt
        .query_map([], |r| r.get(0))?
        .collect::<Result<BTreeSet<u32>, _>>()?;
    Ok(versions)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}
