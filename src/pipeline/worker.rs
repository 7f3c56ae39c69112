//! Background ingestion: one thread per run, events over a channel, cooperative cancel.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::IngestOpts;
use crate::engine::db_ops::CatalogStore;
use crate::error::{IngestError, IngestResult};

use super::context::{
    IngestOutcome, IngestState, PipelineContext, Progress, read_state, write_state,
};
use super::orchestrator::run_ingestion;

/// What the worker reports. Zero or more `Progress`, then exactly one `Finished` or `Failed`.
#[derive(Clone, Debug)]
pub enum IngestEvent {
    Progress(Progress),
    Finished(IngestOutcome),
    Failed(String),
}

impl IngestEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IngestEvent::Progress(_))
    }
}

/// Caller's side of a running ingestion.
pub struct IngestionHandle {
    events: Receiver<IngestEvent>,
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<IngestState>>,
    thread: JoinHandle<IngestResult<IngestOutcome>>,
}

impl IngestionHandle {
    /// Event stream; clones share the same queue.
    pub fn events(&self) -> Receiver<IngestEvent> {
        self.events.clone()
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// The flag [`cancel`](Self::cancel) sets, for signal handlers and other threads.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state(&self) -> IngestState {
        read_state(&self.state)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// True once the run has reached `Finished` or `Errored`. The state is written before the
    /// terminal event is sent, so this holds for anyone who has received that event, even while the
    /// thread is still returning.
    pub fn is_done(&self) -> bool {
        self.state().is_terminal() || self.is_finished()
    }

    /// Wait for the worker and return its result.
    pub fn join(self) -> IngestResult<IngestOutcome> {
        self.thread.join().map_err(|_| IngestError::WorkerPanicked)?
    }
}

fn worker_main(
    root: PathBuf,
    opts: IngestOpts,
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<IngestState>>,
    tx: Sender<IngestEvent>,
) -> IngestResult<IngestOutcome> {
    // The worker owns its own connection; the caller keeps a separate one for reads.
    let store = CatalogStore::open(&opts.db_path())?;
    let ctx = PipelineContext::with_shared(&opts, cancel, state)?;
    let mut on_progress = |p: Progress| {
        let _ = tx.send(IngestEvent::Progress(p));
    };
    run_ingestion(&root, &ctx, &store, &mut on_progress)
}

/// Start ingesting `root` on a new thread. The worker opens its own catalog connection at
/// `opts.db_path()`.
pub fn spawn_ingestion(root: impl Into<PathBuf>, opts: IngestOpts) -> IngestionHandle {
    let root = root.into();
    let (tx, rx) = unbounded::<IngestEvent>();
    let cancel = Arc::new(AtomicBool::new(false));
    let state = Arc::new(Mutex::new(IngestState::Idle));

    let thread = {
        let cancel = Arc::clone(&cancel);
        let state = Arc::clone(&state);
        thread::spawn(move || {
            debug!("worker: ingesting {}", root.display());
            let run = panic::catch_unwind(AssertUnwindSafe(|| {
                worker_main(root, opts, cancel, Arc::clone(&state), tx.clone())
            }));
            let result = match run {
                Ok(result) => result,
                Err(_) => Err(IngestError::WorkerPanicked),
            };
            let event = match &result {
                Ok(outcome) => IngestEvent::Finished(outcome.clone()),
                Err(e) => {
                    write_state(&state, IngestState::Errored);
                    debug!("worker: run failed: {}", e);
                    IngestEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(event);
            result
        })
    };

    IngestionHandle {
        events: rx,
        cancel,
        state,
        thread,
    }
}
