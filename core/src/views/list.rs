//! "My datasets" page.

use super::catalog::{CatalogQuery, CatalogSummary};
use super::Confirm;
use crate::api::{DatasetId, DatasetStatus, DownloadLink};
use crate::format::{format_file_size, format_relative};
use crate::store::{DatasetState, DatasetStore, StorePhase};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// One rendered line of the dataset list
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub id: DatasetId,
    pub name: String,
    pub file_type: String,
    pub size: String,
    pub rows: u64,
    pub columns: u64,
    pub status: DatasetStatus,
    pub uploaded: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListViewModel {
    Loading,
    /// Refresh failed; offer a retry
    Failed { message: String },
    /// Nothing to show; `filtered` when the query hid every dataset
    Empty { filtered: bool },
    Rows {
        rows: Vec<DatasetRow>,
        summary: CatalogSummary,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

pub struct DatasetListView {
    store: DatasetStore,
    confirm: Arc<dyn Confirm>,
}

impl DatasetListView {
    pub fn new(store: DatasetStore, confirm: Arc<dyn Confirm>) -> Self {
        Self { store, confirm }
    }

    /// Fetch (cache permitting) and render
    pub async fn load(&self, query: &CatalogQuery) -> ListViewModel {
        self.store.fetch_datasets(false).await;
        self.render(&self.store.settled().await, query, Utc::now())
    }

    /// Retry after a failure; always hits the backend
    pub async fn retry(&self, query: &CatalogQuery) -> ListViewModel {
        self.store.fetch_datasets(true).await;
        self.render(&self.store.settled().await, query, Utc::now())
    }

    pub fn render(&self, state: &DatasetState, query: &CatalogQuery, now: DateTime<Utc>) -> ListViewModel {
        match state.phase() {
            StorePhase::Loading => return ListViewModel::Loading,
            StorePhase::Error => {
                return ListViewModel::Failed {
                    message: state.error.clone().unwrap_or_default(),
                }
            }
            StorePhase::Empty | StorePhase::Ready => {}
        }

        let visible = query.apply(&state.datasets);
        if visible.is_empty() {
            return ListViewModel::Empty {
                filtered: !state.datasets.is_empty() && !query.is_default(),
            };
        }

        let rows = visible
            .into_iter()
            .map(|d| DatasetRow {
                id: d.id,
                name: d.name.clone(),
                file_type: d.file_type.clone(),
                size: format_file_size(d.file_size),
                rows: d.total_rows,
                columns: d.total_columns,
                status: d.status,
                uploaded: format_relative(d.uploaded_at, now),
            })
            .collect();
        ListViewModel::Rows {
            rows,
            summary: CatalogSummary::of(&state.datasets),
        }
    }

    /// Confirm, delete remotely, then drop the dataset from the store
    pub async fn delete(&self, id: DatasetId) -> Result<DeleteOutcome> {
        let name = self
            .store
            .get_dataset_by_id(id)
            .map(|d| d.name)
            .unwrap_or_else(|| format!("dataset {id}"));
        if !self
            .confirm
            .confirm(&format!("Are you sure you want to delete {name}?"))
        {
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(e) = self.store.api().remove(id).await {
            warn!(target: "dataset_store", id, error = %e, "Failed to delete dataset");
            return Err(e);
        }
        self.store.remove_dataset(id);
        info!(target: "dataset_store", id, "Dataset removed");
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn download(&self, id: DatasetId) -> Result<DownloadLink> {
        self.store.api().download_url(id).await
    }
}
