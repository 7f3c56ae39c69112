//! Media catalog store: upsert and filtered/sorted retrieval over the `media` table.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

use crate::{KindCounts, MediaKind, MediaRecord, SortColumn, SortOrder};

use super::{MEDIA_COLUMNS, UPSERT_MEDIA_SQL, open_db, open_db_in_memory};

/// Owns one connection to the catalog. Open one per thread; the worker and the UI side each hold their own.
pub struct CatalogStore {
    conn: Connection,
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MediaRecord> {
    let size: i64 = row.get(9)?;
    Ok(MediaRecord {
        path: row.get(0)?,
        content_hash: row.get(1)?,
        captured_at: row.get(2)?,
        location: row.get(3)?,
        is_document: row.get(4)?,
        face_ids: row.get(5)?,
        deleted: row.get(6)?,
        backup_status: row.get(7)?,
        thumbnail_path: row.get(8)?,
        file_size_bytes: size.max(0) as u64,
        last_modified_at: row.get(10)?,
        kind: row.get(11)?,
        duration_seconds: row.get(12)?,
        resolution: row.get(13)?,
    })
}

impl CatalogStore {
    /// Open (or create) the catalog file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Underlying connection (for maintenance queries and tests).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Insert or replace the row for `record.path`, keeping an existing row's kind. Committed
    /// immediately.
    pub fn upsert(&self, record: &MediaRecord) -> Result<()> {
        self.conn
            .execute(
                UPSERT_MEDIA_SQL,
                params![
                    record.path,
                    record.content_hash,
                    record.captured_at,
                    record.location,
                    record.thumbnail_path,
                    record.file_size_bytes as i64,
                    record.last_modified_at,
                    record.kind,
                    record.duration_seconds,
                    record.resolution,
                    record.is_document,
                    record.face_ids,
                    record.deleted,
                    record.backup_status,
                ],
            )
            .with_context(|| format!("upsert media {}", record.path))?;
        Ok(())
    }

    /// All non-deleted rows, sorted by `sort` then path, optionally restricted to one kind.
    pub fn list_all(
        &self,
        sort: SortColumn,
        order: SortOrder,
        kind: Option<MediaKind>,
    ) -> Result<Vec<MediaRecord>> {
        let mut sql = format!("SELECT {MEDIA_COLUMNS} FROM media WHERE deleted = 0");
        if kind.is_some() {
            sql.push_str(" AND kind = ?1");
        }
        let col = sort.column_name();
        let dir = order.keyword();
        if sort == SortColumn::Path {
            sql.push_str(&format!(" ORDER BY path {dir}"));
        } else {
            sql.push_str(&format!(" ORDER BY {col} {dir}, path ASC"));
        }

        let mut stmt = self.conn.prepare(&sql).context("prepare list")?;
        let rows = match kind {
            Some(k) => stmt.query_map([k], row_to_record)?,
            None => stmt.query_map([], row_to_record)?,
        };
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read media row")?);
        }
        Ok(out)
    }

    /// Row for `path`, deleted or not.
    pub fn get_by_path(&self, path: &str) -> Result<Option<MediaRecord>> {
        let sql = format!("SELECT {MEDIA_COLUMNS} FROM media WHERE path = ?1");
        self.conn
            .query_row(&sql, [path], row_to_record)
            .optional()
            .with_context(|| format!("get media {path}"))
    }

    /// Number of non-deleted rows.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media WHERE deleted = 0", [], |r| {
                r.get(0)
            })
            .context("count media")?;
        Ok(n.max(0) as usize)
    }

    /// Non-deleted row counts per kind.
    pub fn count_by_kind(&self) -> Result<KindCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM media WHERE deleted = 0 GROUP BY kind")
            .context("prepare count by kind")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, MediaKind>(0)?, r.get::<_, i64>(1)?)))?;
        let mut counts = KindCounts::default();
        for row in rows {
            let (kind, n) = row.context("read kind count")?;
            let n = n.max(0) as usize;
            match kind {
                MediaKind::Image => counts.images = n,
                MediaKind::Video => counts.videos = n,
            }
        }
        Ok(counts)
    }
}
