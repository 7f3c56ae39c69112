//! Application entry object: the reader-side catalog connection plus at most one active run.

use anyhow::Result;
use crossbeam_channel::Receiver;
use log::debug;
use std::path::Path;

use crate::engine::db_ops::CatalogStore;
use crate::error::{IngestError, IngestResult};
use crate::pipeline::{IngestEvent, IngestOutcome, IngestState, IngestionHandle, spawn_ingestion};
use crate::{IngestOpts, KindCounts, MediaKind, MediaRecord, SortColumn, SortOrder};

/// Owns the catalog connection used for display and the handle of the current ingestion, if any.
///
/// Ingestion runs on its own thread with its own connection; listings read through this one and see
/// each file as soon as the worker commits it.
pub struct Library {
    opts: IngestOpts,
    store: CatalogStore,
    active: Option<IngestionHandle>,
}

impl Library {
    /// Open (or create) the catalog under `opts.data_dir`.
    pub fn open(opts: IngestOpts) -> Result<Self> {
        let store = CatalogStore::open(&opts.db_path())?;
        Ok(Self {
            opts,
            store,
            active: None,
        })
    }

    pub fn opts(&self) -> &IngestOpts {
        &self.opts
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Start ingesting `dir` in the background and return its event stream.
    /// Rejected with [`IngestError::AlreadyRunning`] while a previous run is still working.
    pub fn start_ingestion(&mut self, dir: &Path) -> IngestResult<Receiver<IngestEvent>> {
        if self.is_ingesting() {
            return Err(IngestError::AlreadyRunning);
        }
        if let Some(previous) = self.active.take() {
            // Done; its result went out on its own event stream and the join returns promptly.
            let _ = previous.join();
        }
        debug!("library: starting ingestion of {}", dir.display());
        let handle = spawn_ingestion(dir, self.opts.clone());
        let events = handle.events();
        self.active = Some(handle);
        Ok(events)
    }

    /// Ask the active run to stop at the next file boundary. No-op when idle.
    pub fn cancel(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    pub fn is_ingesting(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_done())
    }

    /// State of the current (or last) run; `Idle` when none was started.
    pub fn ingest_state(&self) -> IngestState {
        self.active
            .as_ref()
            .map(|h| h.state())
            .unwrap_or_default()
    }

    /// Block until the active run ends and return its result. `None` when no run was started.
    pub fn wait(&mut self) -> Option<IngestResult<IngestOutcome>> {
        self.active.take().map(IngestionHandle::join)
    }

    pub fn list_all(
        &self,
        sort: SortColumn,
        order: SortOrder,
        kind: Option<MediaKind>,
    ) -> Result<Vec<MediaRecord>> {
        self.store.list_all(sort, order, kind)
    }

    pub fn get_by_path(&self, path: &str) -> Result<Option<MediaRecord>> {
        self.store.get_by_path(path)
    }

    pub fn counts(&self) -> Result<KindCounts> {
        self.store.count_by_kind()
    }
}
