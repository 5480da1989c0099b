//! View-models for the dashboard pages.
//!
//! Views read store state and call store actions; anything they derive
//! (sorting, filtering, formatting) is recomputed per render and never
//! written back to the store.

pub mod catalog;
pub mod detail;
pub mod list;
pub mod upload;

pub use catalog::{CatalogQuery, CatalogSummary, SortKey, TypeFilter};
pub use detail::{ColumnStats, DatasetDetail, DetailView, PreviewTable};
pub use list::{DatasetListView, DatasetRow, DeleteOutcome, ListViewModel};
pub use upload::UploadFlow;

/// Blocking yes/no prompt shown before destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; for non-interactive callers
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
