//! Persistence worker
//!
//! Owns the repository on a dedicated thread. Requests arrive over a
//! crossbeam channel in FIFO order; results go back on an event channel the
//! container polls.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::data::kv::KeyValueStore;
use crate::data::repository::FavoritesRepository;
use crate::data::types::FavoritesCollection;
use crate::error::{FavoritesError, Result};

/// Requests handled by the worker
pub(crate) enum PersistRequest {
    /// Read the stored collection and reply with `Loaded`
    Load,
    /// Overwrite storage with this collection
    Save(FavoritesCollection),
    /// Acknowledge once every earlier request is done
    Flush(Sender<()>),
    /// Exit after finishing earlier requests
    Shutdown,
}

/// Results reported by the worker
#[derive(Debug)]
pub(crate) enum PersistEvent {
    Loaded(FavoritesCollection),
    Saved,
    SaveFailed(String),
}

/// Handle to the running worker thread
pub(crate) struct PersistenceWorker {
    tx: Sender<PersistRequest>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    /// Spawn the worker thread
    pub(crate) fn spawn<S: KeyValueStore + 'static>(
        repository: FavoritesRepository<S>,
    ) -> Result<(Self, Receiver<PersistEvent>)> {
        // Unbounded so enqueueing a save never blocks the caller
        let (tx, rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("favorites-persist".into())
            .spawn(move || run(&repository, &rx, &event_tx))?;

        Ok((
            Self {
                tx,
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// Queue a request
    pub(crate) fn send(&self, request: PersistRequest) -> Result<()> {
        self.tx
            .send(request)
            .map_err(|_| FavoritesError::WorkerUnavailable)
    }

    /// Stop the worker after it drains queued requests, and join it
    pub(crate) fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.tx.send(PersistRequest::Shutdown);
        if handle.join().is_err() {
            warn!("favorites persistence worker panicked");
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker loop. Returns when a `Shutdown` arrives or every sender is gone.
///
/// Consecutive queued saves are coalesced: only the newest collection is
/// written, since each save carries the full state.
pub(crate) fn run<S: KeyValueStore>(
    repository: &FavoritesRepository<S>,
    rx: &Receiver<PersistRequest>,
    events: &Sender<PersistEvent>,
) {
    let mut pending: Option<PersistRequest> = None;

    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => match rx.recv() {
                Ok(request) => request,
                Err(_) => break,
            },
        };

        match request {
            PersistRequest::Load => {
                let _ = events.send(PersistEvent::Loaded(repository.load()));
            }
            PersistRequest::Save(mut collection) => {
                let mut skipped = 0usize;
                while let Ok(next) = rx.try_recv() {
                    match next {
                        PersistRequest::Save(newer) => {
                            collection = newer;
                            skipped += 1;
                        }
                        other => {
                            pending = Some(other);
                            break;
                        }
                    }
                }
                if skipped > 0 {
                    debug!(skipped, "coalesced queued favorites saves");
                }

                let event = match repository.save(&collection) {
                    Ok(()) => PersistEvent::Saved,
                    Err(e) => {
                        warn!(error = %e, count = collection.len(), "failed to save favorites");
                        PersistEvent::SaveFailed(e.to_string())
                    }
                };
                let _ = events.send(event);
            }
            PersistRequest::Flush(ack) => {
                let _ = ack.send(());
            }
            PersistRequest::Shutdown => break,
        }
    }
}
