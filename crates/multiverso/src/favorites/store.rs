//! Favorites state container
//!
//! `FavoritesStore` owns the in-memory collection, applies actions through
//! the reducer, queues a full-collection save after every change, and
//! publishes `StoreEvent`s to subscribers.
//!
//! Drive it from one thread. Persistence results are picked up by `poll`,
//! `wait_ready` and `flush`.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info, warn};

use crate::config::store::FLUSH_TIMEOUT_MS;
use crate::data::kv::KeyValueStore;
use crate::data::repository::FavoritesRepository;
use crate::data::types::{CharacterId, FavoriteRecord, FavoritesCollection};
use crate::error::{FavoritesError, Result};

use super::action::{reduce, FavoriteAction, Outcome};
use super::worker::{PersistEvent, PersistRequest, PersistenceWorker};

type BoxedRepository = FavoritesRepository<Box<dyn KeyValueStore>>;

/// Readiness of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Created, initial load not started
    #[default]
    Uninitialized,
    /// Initial load in flight; queries are not trustworthy yet
    Loading,
    /// Loaded; commands accepted
    Ready,
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Initial load finished
    Ready { count: usize },
    /// Collection changed; carries the new state
    Changed(FavoritesCollection),
    /// A queued save reached storage
    Saved,
    /// A queued save failed; memory is unaffected
    SaveFailed(String),
}

/// Result of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Favorites container backed by a key-value store
pub struct FavoritesStore {
    state: FavoritesCollection,
    lifecycle: Lifecycle,
    /// Repository waiting for `start` (only while uninitialized)
    repository: Option<BoxedRepository>,
    worker: Option<PersistenceWorker>,
    events: Option<Receiver<PersistEvent>>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl FavoritesStore {
    /// Create an uninitialized container over `store`
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        Self::with_repository(FavoritesRepository::new(Box::new(store) as Box<dyn KeyValueStore>))
    }

    /// Create an uninitialized container over a prepared repository
    pub fn with_repository(repository: BoxedRepository) -> Self {
        Self {
            state: FavoritesCollection::new(),
            lifecycle: Lifecycle::Uninitialized,
            repository: Some(repository),
            worker: None,
            events: None,
            subscribers: Vec::new(),
        }
    }

    /// Create a container and start loading immediately
    pub fn open<S: KeyValueStore + 'static>(store: S) -> Self {
        let mut favorites = Self::new(store);
        favorites.start();
        favorites
    }

    /// Start the persistence worker and the initial load
    ///
    /// No-op unless uninitialized. If the worker cannot start, the container
    /// becomes ready with an empty, non-persisting collection.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Uninitialized {
            return;
        }
        let Some(repository) = self.repository.take() else {
            return;
        };

        self.lifecycle = Lifecycle::Loading;
        let spawned = PersistenceWorker::spawn(repository)
            .and_then(|(worker, events)| worker.send(PersistRequest::Load).map(|()| (worker, events)));

        match spawned {
            Ok((worker, events)) => {
                debug!("favorites loading");
                self.worker = Some(worker);
                self.events = Some(events);
            }
            Err(e) => {
                warn!(error = %e, "favorites persistence unavailable, starting empty");
                self.finish_loading(FavoritesCollection::new());
            }
        }
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the initial load has completed
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Process pending worker results without blocking.
    /// Returns the number of results handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.try_next_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Block until ready or `timeout` elapses. Returns readiness.
    ///
    /// A timeout too large to form a deadline waits without one.
    pub fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        self.poll();

        while self.lifecycle == Lifecycle::Loading {
            let received = match (&self.events, deadline) {
                (Some(events), Some(deadline)) => {
                    events.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                (Some(events), None) => events
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
                (None, _) => break,
            };
            match received {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
            }
        }

        self.is_ready()
    }

    /// Wait until every queued save has been attempted, then publish results.
    /// Returns false if the worker did not answer within `timeout`.
    pub fn flush(&mut self, timeout: Duration) -> bool {
        let Some(worker) = &self.worker else {
            return true;
        };

        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if worker.send(PersistRequest::Flush(ack_tx)).is_err() {
            self.poll();
            return false;
        }
        let acked = ack_rx.recv_timeout(timeout).is_ok();
        self.poll();
        acked
    }

    /// Register a subscriber
    ///
    /// A subscriber joining after the initial load first receives `Ready`.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        if self.is_ready() {
            let _ = tx.send(StoreEvent::Ready {
                count: self.state.len(),
            });
        }
        self.subscribers.push(tx);
        rx
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if a character is a favorite (always false before ready)
    pub fn is_favorite(&self, id: CharacterId) -> bool {
        self.is_ready() && self.state.contains(id)
    }

    /// Current favorites, newest first (empty before ready)
    pub fn list(&self) -> &FavoritesCollection {
        &self.state
    }

    /// Get a favorite by id
    pub fn get(&self, id: CharacterId) -> Option<&FavoriteRecord> {
        self.state.get(id)
    }

    /// Get number of favorites
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Toggle favorite status. `record` supplies the snapshot when adding.
    pub fn toggle(&mut self, record: FavoriteRecord) -> Result<Toggled> {
        match self.dispatch(FavoriteAction::Toggle(record))? {
            Outcome::Added(_) => Ok(Toggled::Added),
            Outcome::Removed(_) => Ok(Toggled::Removed),
            outcome @ (Outcome::Replaced | Outcome::Unchanged) => {
                unreachable!("toggle always changes membership, got {outcome:?}")
            }
        }
    }

    /// Add a favorite. Returns false if it was already present.
    pub fn add(&mut self, record: FavoriteRecord) -> Result<bool> {
        Ok(self.dispatch(FavoriteAction::Add(record))?.changed())
    }

    /// Remove a favorite, returning it if it was present
    pub fn remove(&mut self, id: CharacterId) -> Result<Option<FavoriteRecord>> {
        match self.dispatch(FavoriteAction::Remove(id))? {
            Outcome::Removed(record) => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    /// Apply an action; changes are persisted and published
    pub fn dispatch(&mut self, action: FavoriteAction) -> Result<Outcome> {
        if !self.is_ready() {
            return Err(FavoritesError::NotReady);
        }
        self.poll();

        let outcome = reduce(&mut self.state, action);
        if outcome.changed() {
            self.persist();
            self.notify(StoreEvent::Changed(self.state.clone()));
        }
        Ok(outcome)
    }

    /// Stop the worker after it drains queued saves
    pub fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        self.poll();
        self.events = None;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn try_next_event(&mut self) -> Option<PersistEvent> {
        let received = self.events.as_ref()?.try_recv();
        match received {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.worker_lost();
                None
            }
        }
    }

    fn handle_event(&mut self, event: PersistEvent) {
        match event {
            PersistEvent::Loaded(collection) => {
                if self.lifecycle == Lifecycle::Loading {
                    self.finish_loading(collection);
                }
            }
            PersistEvent::Saved => self.notify(StoreEvent::Saved),
            PersistEvent::SaveFailed(reason) => self.notify(StoreEvent::SaveFailed(reason)),
        }
    }

    fn finish_loading(&mut self, collection: FavoritesCollection) {
        reduce(&mut self.state, FavoriteAction::SetAll(collection));
        self.lifecycle = Lifecycle::Ready;
        info!(count = self.state.len(), "favorites ready");
        self.notify(StoreEvent::Ready {
            count: self.state.len(),
        });
    }

    /// The event channel closed: the worker is gone
    fn worker_lost(&mut self) {
        self.events = None;
        if self.worker.take().is_some() {
            warn!("favorites persistence worker stopped unexpectedly");
        }
        if self.lifecycle == Lifecycle::Loading {
            self.finish_loading(FavoritesCollection::new());
        }
    }

    fn persist(&mut self) {
        let queued = match &self.worker {
            Some(worker) => worker.send(PersistRequest::Save(self.state.clone())),
            None => Err(FavoritesError::WorkerUnavailable),
        };
        if let Err(e) = queued {
            warn!(error = %e, "favorites change will not be persisted");
            self.notify(StoreEvent::SaveFailed(e.to_string()));
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Drop for FavoritesStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Default wait used by callers that don't pick their own
pub fn default_flush_timeout() -> Duration {
    Duration::from_millis(FLUSH_TIMEOUT_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::kv::MemoryStore;

    const KEY: &str = "favorites.characters.v1";
    const WAIT: Duration = Duration::from_secs(5);

    fn ready_store(backing: &MemoryStore) -> FavoritesStore {
        let mut store = FavoritesStore::open(backing.clone());
        assert!(store.wait_ready(WAIT));
        store
    }

    fn rick() -> FavoriteRecord {
        FavoriteRecord::new(1).with_name("Rick Sanchez").with_species("Human")
    }

    fn stored_ids(backing: &MemoryStore) -> Vec<u32> {
        let raw = backing.peek(KEY).unwrap_or_else(|| "[]".to_string());
        let collection: FavoritesCollection = serde_json::from_str(&raw).unwrap();
        collection.ids()
    }

    #[test]
    fn test_lifecycle_transitions() {
        let backing = MemoryStore::new();
        let mut store = FavoritesStore::new(backing);
        assert_eq!(store.lifecycle(), Lifecycle::Uninitialized);

        store.start();
        assert_ne!(store.lifecycle(), Lifecycle::Uninitialized);

        assert!(store.wait_ready(WAIT));
        assert_eq!(store.lifecycle(), Lifecycle::Ready);

        // Starting again does nothing
        store.start();
        assert_eq!(store.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn test_wait_ready_without_deadline() {
        let backing = MemoryStore::new();
        backing.set(KEY, r#"[{"id": 2}]"#).unwrap();
        let mut store = FavoritesStore::open(backing);
        assert!(store.wait_ready(Duration::MAX));
        assert!(store.is_favorite(2));

        // Already ready
        assert!(store.wait_ready(Duration::MAX));
    }

    #[test]
    fn test_toggle_reports_direction() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        assert_eq!(store.toggle(rick()).unwrap(), Toggled::Added);
        assert_eq!(store.toggle(FavoriteRecord::new(1)).unwrap(), Toggled::Removed);
        assert_eq!(store.toggle(FavoriteRecord::new(1)).unwrap(), Toggled::Added);
    }

    #[test]
    fn test_commands_rejected_before_ready() {
        let mut store = FavoritesStore::new(MemoryStore::new());
        assert!(matches!(store.toggle(rick()), Err(FavoritesError::NotReady)));
        assert!(matches!(store.add(rick()), Err(FavoritesError::NotReady)));
        assert!(matches!(store.remove(1), Err(FavoritesError::NotReady)));
        assert!(!store.is_favorite(1));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_empty_storage_loads_empty() {
        let backing = MemoryStore::new();
        let store = ready_store(&backing);
        assert!(store.is_empty());
        assert_eq!(backing.peek(KEY), None);
    }

    #[test]
    fn test_add_rick_then_toggle_off() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);

        assert!(store.add(rick()).unwrap());
        assert!(store.is_favorite(1));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list().get(1).unwrap().name.as_deref(), Some("Rick Sanchez"));

        assert_eq!(store.toggle(FavoriteRecord::new(1)).unwrap(), Toggled::Removed);
        assert!(store.list().is_empty());
        assert!(!store.is_favorite(1));
    }

    #[test]
    fn test_duplicate_add_keeps_ids_unique() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);

        assert!(store.add(FavoriteRecord::new(1)).unwrap());
        assert!(!store.add(FavoriteRecord::new(1)).unwrap());
        assert!(store.add(FavoriteRecord::new(2)).unwrap());

        assert_eq!(store.len(), 2);
        let mut ids = store.list().ids();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);

        assert_eq!(store.toggle(FavoriteRecord::new(5)).unwrap(), Toggled::Added);
        assert!(store.is_favorite(5));
        assert_eq!(store.toggle(FavoriteRecord::new(5)).unwrap(), Toggled::Removed);
        assert!(!store.is_favorite(5));
    }

    #[test]
    fn test_list_is_stable_without_mutation() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        store.add(FavoriteRecord::new(1)).unwrap();
        store.add(FavoriteRecord::new(2)).unwrap();

        let first = store.list().clone();
        let second = store.list().clone();
        assert_eq!(first, second);
        assert_eq!(first.ids(), vec![2, 1]);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);

        store.toggle(FavoriteRecord::new(1)).unwrap();
        store.toggle(FavoriteRecord::new(2)).unwrap();
        store.toggle(FavoriteRecord::new(1)).unwrap();
        assert!(store.flush(WAIT));

        assert_eq!(stored_ids(&backing), vec![2]);
    }

    #[test]
    fn test_reopen_restores_favorites() {
        let backing = MemoryStore::new();
        {
            let mut store = ready_store(&backing);
            store.add(rick()).unwrap();
            store.add(FavoriteRecord::new(2).with_name("Morty Smith")).unwrap();
            // Dropping drains queued saves
        }

        let store = ready_store(&backing);
        assert!(store.is_favorite(1));
        assert!(store.is_favorite(2));
        assert_eq!(store.get(2).unwrap().display_name(), "Morty Smith");
        assert_eq!(store.list().ids(), vec![2, 1]);
    }

    #[test]
    fn test_save_failure_keeps_memory() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        let events = store.subscribe();

        backing.set_unavailable(true);
        assert_eq!(store.toggle(FavoriteRecord::new(3)).unwrap(), Toggled::Added);
        assert!(store.is_favorite(3));
        assert!(store.flush(WAIT));
        assert!(store.is_favorite(3));

        let received: Vec<StoreEvent> = events.try_iter().collect();
        assert!(received.iter().any(|e| matches!(e, StoreEvent::SaveFailed(_))));
        assert_eq!(backing.peek(KEY), None);
    }

    #[test]
    fn test_next_save_supersedes_failed_one() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);

        backing.set_unavailable(true);
        store.toggle(FavoriteRecord::new(3)).unwrap();
        assert!(store.flush(WAIT));

        backing.set_unavailable(false);
        store.toggle(FavoriteRecord::new(4)).unwrap();
        assert!(store.flush(WAIT));

        assert_eq!(stored_ids(&backing), vec![4, 3]);
    }

    #[test]
    fn test_unreadable_storage_becomes_ready_empty() {
        let backing = MemoryStore::new();
        backing.set("favorites.characters.v1", r#"[{"id":1}]"#).unwrap();
        backing.set_unavailable(true);

        let store = ready_store(&backing);
        assert!(store.is_ready());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_storage_becomes_ready_empty() {
        let backing = MemoryStore::new();
        backing.set("favorites.characters.v1", "{{{").unwrap();

        let store = ready_store(&backing);
        assert!(store.is_empty());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let backing = MemoryStore::new();
        let mut store = FavoritesStore::new(backing);
        let events = store.subscribe();

        store.start();
        assert!(store.wait_ready(WAIT));
        store.add(rick()).unwrap();
        assert!(store.flush(WAIT));

        let received: Vec<StoreEvent> = events.try_iter().collect();
        assert_eq!(received[0], StoreEvent::Ready { count: 0 });
        match &received[1] {
            StoreEvent::Changed(collection) => assert_eq!(collection.ids(), vec![1]),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(received.contains(&StoreEvent::Saved));
    }

    #[test]
    fn test_late_subscriber_gets_ready() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        let events = store.subscribe();
        assert_eq!(events.try_recv().unwrap(), StoreEvent::Ready { count: 0 });
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        drop(store.subscribe());
        store.add(FavoriteRecord::new(1)).unwrap();
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn test_noop_commands_do_not_publish() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        store.add(FavoriteRecord::new(1)).unwrap();
        let events = store.subscribe();
        let _ = events.try_recv(); // Ready

        assert!(!store.add(FavoriteRecord::new(1)).unwrap());
        assert_eq!(store.remove(99).unwrap(), None);
        assert!(store.flush(WAIT));

        assert!(events.try_iter().all(|e| e == StoreEvent::Saved));
    }

    #[test]
    fn test_remove_returns_record() {
        let backing = MemoryStore::new();
        let mut store = ready_store(&backing);
        store.add(rick()).unwrap();

        let removed = store.remove(1).unwrap().unwrap();
        assert_eq!(removed.species.as_deref(), Some("Human"));
        assert!(store.is_empty());
    }
}
