//! Photocat: photo and video catalog indexer with EXIF/container metadata and thumbnails

pub mod engine;
pub mod error;
pub mod library;
pub mod media;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::db_ops::CatalogStore;
pub use error::{DegradeReason, IngestError, IngestResult};
pub use library::Library;
pub use pipeline::{
    IngestEvent, IngestOutcome, IngestState, IngestionHandle, PipelineContext, Progress,
    ScannedFile, run_ingestion, scan_directory, spawn_ingestion,
};

use log::debug;
use std::path::Path;

/// Result alias used by public photocat API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: ingest `root` into the catalog under `opts.data_dir` on the calling thread.
///
/// `on_progress` is called once per file, in order. Use [`spawn_ingestion`] or [`Library`] to run in
/// the background instead.
pub fn ingest_dir<F>(root: &Path, opts: &IngestOpts, mut on_progress: F) -> IngestResult<IngestOutcome>
where
    F: FnMut(Progress),
{
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    let store = CatalogStore::open(&opts.db_path())?;
    let ctx = PipelineContext::from_opts(opts)?;
    run_ingestion(root, &ctx, &store, &mut on_progress)
}
