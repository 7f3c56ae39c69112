//! Catalog database: schema, open, and the media store.

mod catalog;
mod connection;

pub use catalog::CatalogStore;
pub use connection::{open_db, open_db_in_memory};

/// WAL tuning pragmas. Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        "#;

/// Schema for the media catalog and the reserved faces table.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS media (
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
    last_modified TEXT,
    kind TEXT NOT NULL DEFAULT 'image',
    duration REAL,
    resolution TEXT
);
CREATE INDEX IF NOT EXISTS idx_media_captured_at ON media(captured_at);
CREATE INDEX IF NOT EXISTS idx_media_content_hash ON media(content_hash);

CREATE TABLE IF NOT EXISTS faces (
    id INTEGER PRIMARY KEY,
    person_name TEXT,
    encoding BLOB
);
"#;

/// Columns added after the first catalog version. Applied with ALTER TABLE; "duplicate column" is ignored.
pub(crate) const LEGACY_COLUMNS: &[(&str, &str)] = &[
    ("kind", "TEXT NOT NULL DEFAULT 'image'"),
    ("duration", "REAL"),
    ("resolution", "TEXT"),
];

/// Upsert keyed by path. A re-ingested row is replaced wholesale, which also clears `deleted` and
/// resets the reserved columns to the record's values. Only `kind` survives a conflict.
pub(crate) const UPSERT_MEDIA_SQL: &str = r#"
INSERT INTO media
    (path, content_hash, captured_at, location, thumbnail_path, file_size, last_modified, kind, duration,
     resolution, is_document, face_ids, deleted, backup_status)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
ON CONFLICT(path) DO UPDATE SET
    content_hash = excluded.content_hash,
    captured_at = excluded.captured_at,
    location = excluded.location,
    thumbnail_path = excluded.thumbnail_path,
    file_size = excluded.file_size,
    last_modified = excluded.last_modified,
    duration = excluded.duration,
    resolution = excluded.resolution,
    is_document = excluded.is_document,
    face_ids = excluded.face_ids,
    deleted = excluded.deleted,
    backup_status = excluded.backup_status
"#;

/// Column list shared by every SELECT that builds a [`crate::MediaRecord`].
pub(crate) const MEDIA_COLUMNS: &str = "path, content_hash, captured_at, location, is_document, face_ids, \
     deleted, backup_status, thumbnail_path, file_size, last_modified, kind, duration, resolution";
