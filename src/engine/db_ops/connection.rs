//! Open the catalog database and bring its schema up to date.

use anyhow::{Context, Result};
use log::debug;
use rusqlite::Connection;
use std::path::Path;

use super::{LEGACY_COLUMNS, SCHEMA, WAL_PRAGMAS};

/// Add columns that catalogs created by older versions lack (idempotent).
fn migrate_legacy_columns(conn: &Connection) -> Result<()> {
    for (name, decl) in LEGACY_COLUMNS {
        let sql = format!("ALTER TABLE media ADD COLUMN {name} {decl}");
        match conn.execute_batch(&sql) {
            Ok(()) => debug!("catalog migration: added column {name}"),
            Err(e) if e.to_string().contains("duplicate column") => {}
            Err(e) => return Err(e).with_context(|| format!("add column {name}")),
        }
    }
    Ok(())
}

/// Enable WAL and apply schema to an open connection (idempotent).
fn apply_wal_and_schema(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    migrate_legacy_columns(conn)?;
    Ok(())
}

/// Open or create the catalog DB (creating its parent directory) and ensure schema + WAL.
/// Each thread opens its own connection; a connection is never shared across threads.
pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create catalog directory {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("open catalog database {}", path.display()))?;
    apply_wal_and_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory DB with the same schema (tests; no WAL pragmas needed).
pub fn open_db_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_catalog_gains_new_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE media (
                id INTEGER PRIMARY KEY,
                path TEXT NOT NULL UNIQUE,
                content_hash TEXT,
                captured_at TEXT,
                location TEXT,
                is_document INTEGER NOT NULL DEFAULT 0,
                face_ids TEXT,
                deleted INTEGER NOT NULL DEFAULT 0,
                backup_status TEXT NOT NULL DEFAULT 'not_backed',
                thumbnail_path TEXT,
                file_size INTEGER NOT NULL DEFAULT 0,
                last_modified TEXT
            );
            INSERT INTO media (path) VALUES ('/old/a.jpg');",
        )
        .unwrap();

        conn.execute_batch(SCHEMA).unwrap();
        migrate_legacy_columns(&conn).unwrap();
        // Second pass must be a no-op.
        migrate_legacy_columns(&conn).unwrap();

        let kind: String = conn
            .query_row("SELECT kind FROM media WHERE path = '/old/a.jpg'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(kind, "image");
        let duration: Option<f64> = conn
            .query_row("SELECT duration FROM media", [], |r| r.get(0))
            .unwrap();
        assert_eq!(duration, None);
    }
}
