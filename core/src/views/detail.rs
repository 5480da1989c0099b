//! Dataset detail page: header, column statistics and a data preview.

use crate::api::{Dataset, DatasetColumn, DatasetId, DatasetPatch, PreviewRow};
use crate::store::DatasetStore;
use crate::Result;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDetail {
    pub dataset: Dataset,
    pub columns: Vec<DatasetColumn>,
    pub preview: Vec<PreviewRow>,
}

/// Display strings for one column's statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    pub name: String,
    pub data_type: String,
    pub unique_values: u64,
    pub null_count: u64,
    /// Mean, median, std dev, min, max; numeric columns only
    pub numeric: Option<[String; 5]>,
}

impl From<&DatasetColumn> for ColumnStats {
    fn from(c: &DatasetColumn) -> Self {
        let fmt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "—".to_string());
        Self {
            name: c.column_name.clone(),
            data_type: format!("{:?}", c.data_type).to_uppercase(),
            unique_values: c.unique_values,
            null_count: c.null_count,
            numeric: c.is_numeric().then(|| {
                [
                    fmt(c.mean),
                    fmt(c.median),
                    fmt(c.std_dev),
                    fmt(c.min_value),
                    fmt(c.max_value),
                ]
            }),
        }
    }
}

/// Preview rows laid out as a table; headers come from the first row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreviewTable {
    pub fn from_rows(rows: &[PreviewRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let headers: Vec<String> = first.columns().map(str::to_string).collect();
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }
}

pub struct DetailView {
    store: DatasetStore,
    preview_limit: usize,
}

impl DetailView {
    pub fn new(store: DatasetStore, preview_limit: usize) -> Self {
        Self {
            store,
            preview_limit,
        }
    }

    /// Cached entry to render while the detail request is in flight
    pub fn placeholder(&self, id: DatasetId) -> Option<Dataset> {
        self.store.get_dataset_by_id(id)
    }

    /// Fetch dataset, columns and preview concurrently. The cached list entry
    /// is brought up to date with the fetched dataset.
    pub async fn load(&self, id: DatasetId) -> Result<DatasetDetail> {
        let api = self.store.api();
        let (dataset, columns, preview) = tokio::try_join!(
            api.get(id),
            api.columns(id),
            api.preview(id, self.preview_limit)
        )?;
        debug!(target: "gateway", id, columns = columns.len(), rows = preview.len(), "Loaded dataset detail");

        self.store.update_dataset(id, DatasetPatch::from(&dataset));
        Ok(DatasetDetail {
            dataset,
            columns,
            preview,
        })
    }
}
