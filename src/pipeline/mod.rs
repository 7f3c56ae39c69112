//! Ingestion pipeline: scan, per-file record assembly, orchestration and the background worker.

pub mod context;
pub mod error_handler;
pub mod metadata;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use context::{IngestOutcome, IngestState, PipelineContext, Progress, ScanOpts};
pub use error_handler::report_skipped_paths;
pub use metadata::build_record;
pub use orchestrator::run_ingestion;
pub use walk::{ScannedFile, WalkOutcome, run_walk_loop, scan_directory, to_outcome_walkdir};
pub use worker::{IngestEvent, IngestionHandle, spawn_ingestion};
