//! Client-side sort, filter and search over the held datasets.

use crate::api::{Dataset, DatasetStatus};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest upload first
    #[default]
    Recent,
    Oldest,
    Name,
    /// Largest first
    Size,
    /// Most rows first
    Rows,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(SortKey::Recent),
            "oldest" => Ok(SortKey::Oldest),
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            "rows" => Ok(SortKey::Rows),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Csv,
    Excel,
}

impl TypeFilter {
    pub fn matches(self, dataset: &Dataset) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Csv => dataset.file_type.eq_ignore_ascii_case("csv"),
            TypeFilter::Excel => dataset.file_type.eq_ignore_ascii_case("excel"),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "csv" => Ok(TypeFilter::Csv),
            "excel" | "xlsx" | "xls" => Ok(TypeFilter::Excel),
            other => Err(format!("unknown file type filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub filter: TypeFilter,
    pub sort: SortKey,
}

impl CatalogQuery {
    pub fn is_default(&self) -> bool {
        self.search.trim().is_empty() && self.filter == TypeFilter::All && self.sort == SortKey::Recent
    }

    pub fn matches(&self, dataset: &Dataset) -> bool {
        if dataset.name.is_empty() {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        let found = needle.is_empty() || dataset.name.to_lowercase().contains(&needle);
        found && self.filter.matches(dataset)
    }

    /// Matching datasets in display order. The sort is stable, so ties keep
    /// the store's recency order.
    pub fn apply<'a>(&self, datasets: &'a [Dataset]) -> Vec<&'a Dataset> {
        let mut out: Vec<&Dataset> = datasets.iter().filter(|d| self.matches(d)).collect();
        out.sort_by(|a, b| compare(self.sort, a, b));
        out
    }
}

fn compare(key: SortKey, a: &Dataset, b: &Dataset) -> Ordering {
    match key {
        SortKey::Recent => newest_first(a, b),
        SortKey::Oldest => newest_first(b, a),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Size => b.file_size.cmp(&a.file_size),
        SortKey::Rows => b.total_rows.cmp(&a.total_rows),
    }
}

/// A missing upload time means the record has not been listed yet (a fresh
/// upload receipt), so it counts as the newest.
fn newest_first(a: &Dataset, b: &Dataset) -> Ordering {
    match (a.uploaded_at, b.uploaded_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Totals shown above the dataset list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub datasets: usize,
    pub total_rows: u64,
    pub total_bytes: u64,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl CatalogSummary {
    pub fn of(datasets: &[Dataset]) -> Self {
        datasets.iter().fold(Self::default(), |mut acc, d| {
            acc.datasets += 1;
            acc.total_rows += d.total_rows;
            acc.total_bytes += d.file_size;
            match d.status {
                DatasetStatus::Processing => acc.processing += 1,
                DatasetStatus::Completed => acc.completed += 1,
                DatasetStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }
}
