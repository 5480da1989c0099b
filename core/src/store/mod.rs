//! Dataset cache store
//!
//! Session-lifetime local view of "my datasets", kept consistent with the
//! backend under concurrent refresh and local edits:
//!
//! - `fetch_datasets` is single-flight and honors a staleness window unless forced
//! - refresh failures keep the previously held datasets and land in `error`
//! - `add_dataset` / `update_dataset` / `remove_dataset` are synchronous local edits;
//!   edits made while a refresh is in flight are re-applied to its result
//! - a refresh runs to completion even if the caller stops waiting for it
//!
//! State changes are published on a `watch` channel for views to observe.

mod clock;
mod state;

pub use clock::{Clock, SystemClock};
pub use state::{DatasetState, StorePhase};

use crate::api::{Dataset, DatasetApi, DatasetId, DatasetListing, DatasetPatch};
use crate::{DashError, Result};
use chrono::{DateTime, Utc};
use state::LocalMutation;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Default staleness window of a full refresh
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

const FETCH_FAILED: &str = "Failed to load datasets";

/// What a call to [`DatasetStore::fetch_datasets`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another refresh was already running; its result will land in the state
    InFlight,
    /// Cached datasets are still fresh
    CacheHit,
    Refreshed(usize),
    Failed(String),
    /// The store was cleared while the request was in flight
    Discarded,
}

struct Inner {
    state: DatasetState,
    journal: Vec<LocalMutation>,
    /// Bumped by `clear_datasets`; refreshes from an older epoch are dropped
    epoch: u64,
    cache_duration: Duration,
}

impl Inner {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let Some(last) = self.state.last_fetch else {
            return false;
        };
        match now.signed_duration_since(last).to_std() {
            Ok(elapsed) => elapsed < self.cache_duration,
            // clock moved backwards
            Err(_) => true,
        }
    }
}

struct Shared {
    api: Arc<dyn DatasetApi>,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    tx: watch::Sender<DatasetState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.tx.send_replace(inner.state.clone());
    }

    fn reconcile(
        &self,
        epoch: u64,
        started: DateTime<Utc>,
        result: Result<DatasetListing>,
    ) -> FetchOutcome {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!(target: "dataset_store", "Dropping refresh issued before the store was cleared");
            return FetchOutcome::Discarded;
        }

        let pending = std::mem::take(&mut inner.journal);
        let outcome = match result {
            Ok(listing) => {
                let mut datasets = listing.into_vec();
                for mutation in &pending {
                    mutation.replay(&mut datasets);
                }
                if !pending.is_empty() {
                    debug!(
                        target: "dataset_store",
                        replayed = pending.len(),
                        "Re-applied local changes made during refresh"
                    );
                }
                let count = datasets.len();
                inner.state.datasets = datasets;
                inner.state.last_fetch = Some(started);
                inner.state.error = None;
                info!(target: "dataset_store", count, "Datasets refreshed");
                FetchOutcome::Refreshed(count)
            }
            Err(e) => {
                let message = e.user_message(FETCH_FAILED);
                warn!(target: "dataset_store", error = %e, "Failed to fetch datasets");
                inner.state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        };
        inner.state.loading = false;
        self.publish(&inner);
        outcome
    }
}

/// Handle to the dataset cache; clones share the same state.
#[derive(Clone)]
pub struct DatasetStore {
    shared: Arc<Shared>,
}

impl DatasetStore {
    pub fn new(api: Arc<dyn DatasetApi>) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<dyn DatasetApi>, clock: Arc<dyn Clock>) -> Self {
        let (tx, _rx) = watch::channel(DatasetState::default());
        Self {
            shared: Arc::new(Shared {
                api,
                clock,
                inner: Mutex::new(Inner {
                    state: DatasetState::default(),
                    journal: Vec::new(),
                    epoch: 0,
                    cache_duration: CACHE_DURATION,
                }),
                tx,
            }),
        }
    }

    pub fn with_cache_duration(self, duration: Duration) -> Self {
        self.shared.lock().cache_duration = duration;
        self
    }

    pub fn cache_duration(&self) -> Duration {
        self.shared.lock().cache_duration
    }

    /// Gateway used for refreshes, also handed to views for entity-local calls
    pub fn api(&self) -> Arc<dyn DatasetApi> {
        Arc::clone(&self.shared.api)
    }

    /// Refresh the held collection from the backend.
    ///
    /// No-op while another refresh is in flight, and, unless `force` is set,
    /// while the last successful refresh is younger than the cache duration.
    /// Never fails: errors end up in [`DatasetState::error`].
    pub async fn fetch_datasets(&self, force: bool) -> FetchOutcome {
        let now = self.shared.clock.now();
        let epoch = {
            let mut inner = self.shared.lock();
            if inner.state.loading {
                debug!(target: "dataset_store", "Refresh already in flight");
                return FetchOutcome::InFlight;
            }
            if !force && inner.is_fresh(now) {
                debug!(target: "dataset_store", "Using cached datasets");
                return FetchOutcome::CacheHit;
            }
            inner.state.loading = true;
            inner.state.error = None;
            inner.journal.clear();
            self.shared.publish(&inner);
            inner.epoch
        };

        // Spawned so the result is applied even if this future is dropped.
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let result = shared.api.list().await;
            shared.reconcile(epoch, now, result)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(target: "dataset_store", error = %e, "Dataset refresh task aborted");
                self.shared.reconcile(
                    epoch,
                    now,
                    Err(DashError::Network(format!("refresh task aborted: {e}"))),
                )
            }
        }
    }

    /// Put a freshly uploaded dataset at the front
    pub fn add_dataset(&self, dataset: Dataset) {
        self.mutate(LocalMutation::Add(dataset));
    }

    /// Merge `patch` into the dataset with `id`; no-op when absent
    pub fn update_dataset(&self, id: DatasetId, patch: DatasetPatch) {
        self.mutate(LocalMutation::Update(id, patch));
    }

    /// Drop the dataset with `id`; no-op when absent
    pub fn remove_dataset(&self, id: DatasetId) {
        self.mutate(LocalMutation::Remove(id));
    }

    pub fn get_dataset_by_id(&self, id: DatasetId) -> Option<Dataset> {
        self.shared.lock().state.get(id).cloned()
    }

    /// Back to the initial empty state, e.g. on logout
    pub fn clear_datasets(&self) {
        let mut inner = self.shared.lock();
        inner.state = DatasetState::default();
        inner.journal.clear();
        inner.epoch += 1;
        self.shared.publish(&inner);
        debug!(target: "dataset_store", "Dataset cache cleared");
    }

    pub fn snapshot(&self) -> DatasetState {
        self.shared.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DatasetState> {
        self.shared.tx.subscribe()
    }

    /// Wait until no refresh is in flight and return the state at that point
    pub async fn settled(&self) -> DatasetState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|s| !s.loading).await.map(|s| (*s).clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    fn mutate(&self, mutation: LocalMutation) {
        let mut inner = self.shared.lock();
        let changed = mutation.apply(&mut inner.state.datasets);
        if inner.state.loading {
            inner.journal.push(mutation);
        }
        if changed {
            self.shared.publish(&inner);
        }
    }
}
