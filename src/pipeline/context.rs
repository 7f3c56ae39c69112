//! Pipeline context and run state: handlers, thumbnail store, scan settings and the shared
//! cancel/state cells a caller on another thread can observe.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::IngestOpts;
use crate::MediaRecord;
use crate::engine::tools::canonicalize_existing;
use crate::media::{MediaHandlers, ThumbnailStore};

/// Where one ingestion run is. `Finished` and `Errored` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IngestState {
    #[default]
    Idle,
    Scanning,
    Processing {
        current: usize,
        total: usize,
    },
    Finished,
    Errored,
}

impl IngestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestState::Finished | IngestState::Errored)
    }
}

/// Emitted once per file after it has been handled, in file order. `current` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// Result of a run that was not aborted.
#[derive(Clone, Debug, Default)]
pub struct IngestOutcome {
    /// Records upserted during this run, in processing order.
    pub records: Vec<MediaRecord>,
    /// Number of candidate files the scan found.
    pub total: usize,
    /// True when the run stopped early on a cancel request.
    pub cancelled: bool,
}

/// Walk settings for the scanner.
#[derive(Clone, Debug, Default)]
pub struct ScanOpts {
    pub follow_links: bool,
    /// Glob patterns matched against names and full paths.
    pub exclude: Vec<String>,
    /// Canonical directories never entered (the catalog data dir).
    pub skip_dirs: Vec<PathBuf>,
}

impl ScanOpts {
    pub fn from_opts(opts: &IngestOpts) -> Self {
        let skip_dirs = [opts.data_dir.clone(), opts.thumbnail_dir()]
            .iter()
            .filter_map(|d| canonicalize_existing(d))
            .collect();
        Self {
            follow_links: opts.follow_links,
            exclude: opts.exclude.clone(),
            skip_dirs,
        }
    }
}

/// Everything the orchestrator needs besides the catalog store.
pub struct PipelineContext {
    pub handlers: MediaHandlers,
    pub thumbs: ThumbnailStore,
    pub scan: ScanOpts,
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<IngestState>>,
}

impl PipelineContext {
    /// Build from options with fresh cancel/state cells. Creates the thumbnail dir.
    pub fn from_opts(opts: &IngestOpts) -> Result<Self> {
        Self::with_shared(
            opts,
            Arc::new(AtomicBool::new(false)),
            Arc::new(Mutex::new(IngestState::Idle)),
        )
    }

    /// Build from options, sharing `cancel` and `state` with the caller.
    pub fn with_shared(
        opts: &IngestOpts,
        cancel: Arc<AtomicBool>,
        state: Arc<Mutex<IngestState>>,
    ) -> Result<Self> {
        let thumbs = ThumbnailStore::new(opts.thumbnail_dir())?;
        Ok(Self {
            handlers: MediaHandlers::from_opts(opts),
            thumbs,
            scan: ScanOpts::from_opts(opts),
            cancel,
            state,
        })
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state_handle(&self) -> Arc<Mutex<IngestState>> {
        Arc::clone(&self.state)
    }

    /// Request a cooperative stop; honoured at the next file boundary.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> IngestState {
        read_state(&self.state)
    }

    pub(crate) fn set_state(&self, next: IngestState) {
        write_state(&self.state, next);
    }
}

/// Read a shared state cell. A poisoned lock still holds the last written state.
pub fn read_state(cell: &Mutex<IngestState>) -> IngestState {
    match cell.lock() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

pub(crate) fn write_state(cell: &Mutex<IngestState>, next: IngestState) {
    match cell.lock() {
        Ok(mut guard) => *guard = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
}
