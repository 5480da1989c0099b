use crate::api::{Dataset, DatasetId, DatasetPatch};
use chrono::{DateTime, Utc};

/// Observable state of the dataset store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetState {
    /// Most recent upload first
    pub datasets: Vec<Dataset>,
    /// A full refresh is in flight
    pub loading: bool,
    /// Message from the last failed refresh
    pub error: Option<String>,
    /// Start time of the last successful refresh
    pub last_fetch: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    /// Nothing fetched yet
    Empty,
    Loading,
    Ready,
    /// Last refresh failed; whatever was held before is kept
    Error,
}

impl DatasetState {
    pub fn phase(&self) -> StorePhase {
        if self.loading {
            StorePhase::Loading
        } else if self.error.is_some() {
            StorePhase::Error
        } else if self.last_fetch.is_none() && self.datasets.is_empty() {
            StorePhase::Empty
        } else {
            StorePhase::Ready
        }
    }

    pub fn get(&self, id: DatasetId) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }
}

/// A local edit, kept while a refresh is in flight so it can be re-applied
/// on top of the refreshed collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LocalMutation {
    Add(Dataset),
    Update(DatasetId, DatasetPatch),
    Remove(DatasetId),
}

impl LocalMutation {
    /// Apply directly from a user action. Adding an id that is already
    /// held replaces that entry and moves it to the front.
    pub(crate) fn apply(&self, datasets: &mut Vec<Dataset>) -> bool {
        match self {
            LocalMutation::Add(dataset) => {
                datasets.retain(|d| d.id != dataset.id);
                datasets.insert(0, dataset.clone());
                true
            }
            LocalMutation::Update(id, patch) => datasets
                .iter_mut()
                .find(|d| d.id == *id)
                .map(|d| d.apply(patch))
                .unwrap_or(false),
            LocalMutation::Remove(id) => {
                let before = datasets.len();
                datasets.retain(|d| d.id != *id);
                datasets.len() != before
            }
        }
    }

    /// Re-apply onto a freshly fetched collection. The server copy of an
    /// added dataset wins if the refresh already contains it.
    pub(crate) fn replay(&self, datasets: &mut Vec<Dataset>) {
        match self {
            LocalMutation::Add(dataset) if datasets.iter().any(|d| d.id == dataset.id) => {}
            other => {
                other.apply(datasets);
            }
        }
    }
}
