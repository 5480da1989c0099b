// Shared fakes for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use datadash_core::api::{
    AuthApi, AuthResponse, ColumnType, Dataset, DatasetApi, DatasetColumn, DatasetId,
    DatasetListing, DatasetStatus, DownloadLink, LoginRequest, PreviewRow, RegisterRequest,
    UploadFile, UserSummary,
};
use datadash_core::http::{ApiRequest, ApiResponse, ProgressFn, Transport};
use datadash_core::store::Clock;
use datadash_core::{DashError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// =============================================================================
// Fixtures
// =============================================================================

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn dataset(id: DatasetId, name: &str) -> Dataset {
    Dataset {
        file_type: "CSV".to_string(),
        file_size: 1024 * id as u64,
        total_rows: 10 * id as u64,
        total_columns: 3,
        uploaded_at: Some(base_time() - ChronoDuration::hours(id)),
        ..Dataset::new(id, name)
    }
}

pub fn completed(id: DatasetId, name: &str) -> Dataset {
    Dataset {
        status: DatasetStatus::Completed,
        ..dataset(id, name)
    }
}

pub fn column(index: u32, name: &str, data_type: ColumnType) -> DatasetColumn {
    DatasetColumn {
        id: index as i64 + 1,
        dataset_id: None,
        column_name: name.to_string(),
        column_index: index,
        data_type,
        unique_values: 4,
        null_count: 0,
        mean: None,
        median: None,
        std_dev: None,
        min_value: None,
        max_value: None,
    }
}

// =============================================================================
// Manual clock
// =============================================================================

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += ChronoDuration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Fake dataset API
// =============================================================================

/// In-memory `DatasetApi`. Listings are served from a queue (empty list once
/// drained); with a gate, each `list` call parks until the gate is notified.
#[derive(Default)]
pub struct FakeApi {
    pub listings: Mutex<VecDeque<Result<DatasetListing>>>,
    pub gate: Option<Arc<Notify>>,
    pub list_calls: AtomicUsize,
    pub datasets: Mutex<Vec<Dataset>>,
    pub columns: Vec<DatasetColumn>,
    pub preview: Vec<PreviewRow>,
    pub removed: Mutex<Vec<DatasetId>>,
    pub fail_remove: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the API and the gate releasing its `list` calls
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let api = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (api, gate)
    }

    pub fn push_list(&self, result: Result<Vec<Dataset>>) {
        self.push_listing(result.map(DatasetListing::from));
    }

    pub fn push_listing(&self, result: Result<DatasetListing>) {
        self.listings.lock().unwrap().push_back(result);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetApi for FakeApi {
    async fn list(&self) -> Result<DatasetListing> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DatasetListing::from(Vec::new())))
    }

    async fn get(&self, id: DatasetId) -> Result<Dataset> {
        self.datasets
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| DashError::NotFound(format!("dataset {id}")))
    }

    async fn upload(&self, file: UploadFile, on_progress: Option<ProgressFn>) -> Result<Dataset> {
        file.validate(1024 * 1024)?;
        if let Some(cb) = &on_progress {
            cb(40);
            cb(100);
        }
        Ok(Dataset {
            file_type: "CSV".to_string(),
            ..Dataset::new(100, file.file_name())
        })
    }

    async fn columns(&self, _id: DatasetId) -> Result<Vec<DatasetColumn>> {
        Ok(self.columns.clone())
    }

    async fn preview(&self, _id: DatasetId, limit: usize) -> Result<Vec<PreviewRow>> {
        Ok(self.preview.iter().take(limit).cloned().collect())
    }

    async fn download_url(&self, id: DatasetId) -> Result<DownloadLink> {
        Ok(DownloadLink {
            download_url: format!("https://files.example.com/{id}"),
            filename: format!("dataset-{id}.csv"),
        })
    }

    async fn remove(&self, id: DatasetId) -> Result<()> {
        if self.fail_remove {
            return Err(DashError::Server {
                status: 500,
                message: Some("Failed to delete dataset".to_string()),
            });
        }
        self.removed.lock().unwrap().push(id);
        Ok(())
    }
}

// =============================================================================
// Fake auth API
// =============================================================================

#[derive(Default)]
pub struct FakeAuth {
    pub logins: AtomicUsize,
    pub fail_logout: bool,
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: Some(UserSummary {
                name: "Ada".to_string(),
                email: request.email.clone(),
                roles: vec!["USER".to_string()],
            }),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            user: Some(UserSummary {
                name: request.name.clone(),
                email: request.email.clone(),
                roles: Vec::new(),
            }),
        })
    }

    async fn logout(&self) -> Result<()> {
        if self.fail_logout {
            return Err(DashError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Scripted transport
// =============================================================================

#[derive(Default)]
struct Script {
    routes: HashMap<String, VecDeque<ApiResponse>>,
    seen: Vec<ApiRequest>,
}

/// `Transport` answering from per-path response queues. Unscripted calls
/// get an empty 404. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: ApiResponse) -> &Self {
        self.script
            .lock()
            .unwrap()
            .routes
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn seen(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().seen.clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.seen().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut script = self.script.lock().unwrap();
        script.seen.push(request.clone());
        Ok(script
            .routes
            .get_mut(&request.path)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| ApiResponse::empty(404)))
    }
}
