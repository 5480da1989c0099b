use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

pub type DatasetId = i64;

/// Processing outcome of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl DatasetStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DatasetStatus::Processing)
    }

    /// Statuses only move forward: once terminal, a dataset keeps its status
    pub fn can_transition_to(self, next: DatasetStatus) -> bool {
        !self.is_terminal() || self == next
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetStatus::Processing => "PROCESSING",
            DatasetStatus::Completed => "COMPLETED",
            DatasetStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file and its processing outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    /// Backend storage location; opaque to the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// "CSV" or "EXCEL"
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub total_columns: u64,
    #[serde(default)]
    pub status: DatasetStatus,
    #[serde(default, alias = "createdAt", deserialize_with = "lenient_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Dataset {
    pub fn new(id: DatasetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            file_path: None,
            file_type: String::new(),
            file_size: 0,
            total_rows: 0,
            total_columns: 0,
            status: DatasetStatus::default(),
            uploaded_at: None,
            updated_at: None,
        }
    }

    /// Merge `patch` into this dataset. A status change that would move a
    /// terminal status backwards is ignored. Returns whether anything changed.
    pub fn apply(&mut self, patch: &DatasetPatch) -> bool {
        let before = self.clone();
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(file_type) = &patch.file_type {
            self.file_type = file_type.clone();
        }
        if let Some(size) = patch.file_size {
            self.file_size = size;
        }
        if let Some(rows) = patch.total_rows {
            self.total_rows = rows;
        }
        if let Some(cols) = patch.total_columns {
            self.total_columns = cols;
        }
        if let Some(next) = patch.status {
            if self.status.can_transition_to(next) {
                self.status = next;
            } else {
                debug!(
                    id = self.id,
                    from = %self.status,
                    to = %next,
                    "Ignoring status downgrade"
                );
            }
        }
        if let Some(ts) = patch.updated_at {
            self.updated_at = Some(ts);
        }
        *self != before
    }
}

/// Partial update of a [`Dataset`]; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetPatch {
    pub name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub total_rows: Option<u64>,
    pub total_columns: Option<u64>,
    pub status: Option<DatasetStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DatasetPatch {
    pub fn status(status: DatasetStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl From<&Dataset> for DatasetPatch {
    fn from(d: &Dataset) -> Self {
        Self {
            name: Some(d.name.clone()),
            file_type: Some(d.file_type.clone()),
            file_size: Some(d.file_size),
            total_rows: Some(d.total_rows),
            total_columns: Some(d.total_columns),
            status: Some(d.status),
            updated_at: d.updated_at,
        }
    }
}

/// Accepts RFC 3339 or zone-less ISO timestamps (read as UTC); anything
/// unparseable becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Payload of the dataset listing endpoint.
///
/// A JSON array always decodes as `Items`; elements that do not decode as a
/// dataset are skipped with a warning. Anything else is kept as `Unexpected`
/// so the caller can decide how to degrade instead of failing the request.
#[derive(Debug, Clone)]
pub enum DatasetListing {
    Items(Vec<Dataset>),
    Unexpected(Value),
}

impl<'de> Deserialize<'de> for DatasetListing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Array(elements) = value else {
            return Ok(DatasetListing::Unexpected(value));
        };
        let items = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| match Dataset::deserialize(element) {
                Ok(dataset) => Some(dataset),
                Err(e) => {
                    warn!(target: "gateway", index, error = %e, "Skipping malformed dataset in listing");
                    None
                }
            })
            .collect();
        Ok(DatasetListing::Items(items))
    }
}

impl DatasetListing {
    pub fn into_vec(self) -> Vec<Dataset> {
        match self {
            DatasetListing::Items(items) => items,
            DatasetListing::Unexpected(value) => {
                warn!(
                    target: "gateway",
                    kind = json_kind(&value),
                    "Dataset listing is not an array of datasets; treating as empty"
                );
                Vec::new()
            }
        }
    }
}

impl From<Vec<Dataset>> for DatasetListing {
    fn from(items: Vec<Dataset>) -> Self {
        DatasetListing::Items(items)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Numeric,
    Text,
    Date,
    Boolean,
}

/// Backend-computed statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetColumn {
    pub id: i64,
    /// Owning dataset; the columns endpoint omits it, the gateway fills it in
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    pub column_name: String,
    pub column_index: u32,
    pub data_type: ColumnType,
    #[serde(default)]
    pub unique_values: u64,
    #[serde(default)]
    pub null_count: u64,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub std_dev: Option<f64>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl DatasetColumn {
    pub fn is_numeric(&self) -> bool {
        self.data_type == ColumnType::Numeric
    }
}

/// Short-lived link for client-initiated downloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub download_url: String,
    pub filename: String,
}

/// Dynamically typed preview cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<Value> for CellValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            Value::String(s) => CellValue::Text(s),
            nested => CellValue::Text(nested.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One preview row: cells keyed by column name, in backend column order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PreviewRow {
    cells: Vec<(String, CellValue)>,
}

impl PreviewRow {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Map<String, Value>> for PreviewRow {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            cells: map.into_iter().map(|(k, v)| (k, CellValue::from(v))).collect(),
        }
    }
}

impl FromIterator<(String, CellValue)> for PreviewRow {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
