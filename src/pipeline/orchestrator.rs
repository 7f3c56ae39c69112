use log::debug;
use std::path::Path;

use crate::engine::db_ops::CatalogStore;
use crate::error::{IngestError, IngestResult};

use super::context::{IngestOutcome, IngestState, PipelineContext, Progress};
use super::metadata::build_record;
use super::walk::scan_directory;

/// Run one ingestion over `root` on the calling thread.
///
/// Scans, then for each file in order: checks the cancel flag, builds and upserts its record, and
/// calls `on_progress` with `(i + 1, n)` whether or not the file produced a record. Each upsert is
/// committed on its own, so a cancelled or failed run keeps what it wrote. A missing root returns
/// [`IngestError::NotFound`] before anything is written; a store failure ends the run as
/// [`IngestError::Unexpected`].
pub fn run_ingestion(
    root: &Path,
    ctx: &PipelineContext,
    store: &CatalogStore,
    on_progress: &mut dyn FnMut(Progress),
) -> IngestResult<IngestOutcome> {
    ctx.set_state(IngestState::Scanning);
    let files =
        scan_directory(root, &ctx.scan).inspect_err(|_| ctx.set_state(IngestState::Errored))?;
    let total = files.len();
    debug!("ingest: {} candidate files", total);
    ctx.set_state(IngestState::Processing { current: 0, total });

    let mut records = Vec::with_capacity(total);
    let mut cancelled = false;
    for (i, file) in files.iter().enumerate() {
        if ctx.is_cancelled() {
            debug!("ingest: cancelled after {} of {}", i, total);
            cancelled = true;
            break;
        }
        if let Some(record) = build_record(file, ctx) {
            if let Err(e) = store.upsert(&record) {
                ctx.set_state(IngestState::Errored);
                return Err(IngestError::Unexpected(e));
            }
            records.push(record);
        }
        let progress = Progress {
            current: i + 1,
            total,
        };
        ctx.set_state(IngestState::Processing {
            current: progress.current,
            total,
        });
        on_progress(progress);
    }

    ctx.set_state(IngestState::Finished);
    debug!("ingest: finished with {} records", records.len());
    Ok(IngestOutcome {
        records,
        total,
        cancelled,
    })
}
