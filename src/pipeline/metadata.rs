//! Per-file record assembly: stat, hash, kind-specific metadata and thumbnail.
//!
//! Every sub-step degrades only its own field. The only way a file produces no record is when it can
//! no longer be stat'ed (it vanished between scan and processing).

use log::{debug, warn};

use crate::MediaRecord;
use crate::engine::hashing::hash_file;
use crate::engine::tools::{now_local, path_to_db_string, system_time_to_local};

use super::context::PipelineContext;
use super::walk::ScannedFile;

/// Build the catalog record for `file`. `None` when the file is gone.
pub fn build_record(file: &ScannedFile, ctx: &PipelineContext) -> Option<MediaRecord> {
    let path = &file.path;
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            debug!("{}: stat failed, no record: {}", path.display(), e);
            return None;
        }
    };

    let content_hash = match hash_file(path) {
        Ok(h) => Some(h),
        Err(e) => {
            warn!("{}: hash failed: {}", path.display(), e);
            None
        }
    };

    let handler = ctx.handlers.for_kind(file.kind);
    let (fields, reason) = handler.extract_metadata(path).into_parts();
    if let Some(reason) = reason {
        debug!("{}: metadata degraded: {}", path.display(), reason);
    }

    let dest = ctx.thumbs.path_for(path, file.kind);
    let thumbnail_path = match handler.generate_thumbnail(path, &dest) {
        Ok(()) => Some(path_to_db_string(&dest)),
        Err(reason) => {
            debug!("{}: no thumbnail: {}", path.display(), reason);
            None
        }
    };

    let now = now_local();
    let mut record = MediaRecord::new(path_to_db_string(path), file.kind);
    record.content_hash = content_hash;
    record.captured_at = Some(fields.captured_at.unwrap_or(now));
    record.location = fields.location;
    record.thumbnail_path = thumbnail_path;
    record.file_size_bytes = meta.len();
    record.last_modified_at = Some(
        meta.modified()
            .map(system_time_to_local)
            .unwrap_or(now),
    );
    record.duration_seconds = fields.duration_seconds;
    record.resolution = fields.resolution;
    Some(record)
}
