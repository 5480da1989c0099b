use super::models::{Dataset, DatasetColumn, DatasetId, DatasetListing, DownloadLink, PreviewRow};
use super::upload::UploadFile;
use crate::http::{ApiRequest, HttpClient, ProgressFn, ProgressTracker};
use crate::{DashError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remote dataset operations
#[async_trait]
pub trait DatasetApi: Send + Sync {
    /// Every dataset owned by the signed-in user
    async fn list(&self) -> Result<DatasetListing>;

    async fn get(&self, id: DatasetId) -> Result<Dataset>;

    /// Upload a file; `on_progress` receives non-decreasing percentages
    /// ending at 100 once the body has been sent.
    async fn upload(&self, file: UploadFile, on_progress: Option<ProgressFn>) -> Result<Dataset>;

    /// Column statistics ordered by column index
    async fn columns(&self, id: DatasetId) -> Result<Vec<DatasetColumn>>;

    /// At most `limit` rows
    async fn preview(&self, id: DatasetId, limit: usize) -> Result<Vec<PreviewRow>>;

    async fn download_url(&self, id: DatasetId) -> Result<DownloadLink>;

    async fn remove(&self, id: DatasetId) -> Result<()>;
}

/// [`DatasetApi`] over the backend REST endpoints
#[derive(Clone)]
pub struct DatasetGateway {
    http: HttpClient,
    max_upload_bytes: u64,
}

impl DatasetGateway {
    pub fn new(http: HttpClient, max_upload_bytes: u64) -> Self {
        Self {
            http,
            max_upload_bytes,
        }
    }
}

fn dataset_not_found(id: DatasetId) -> impl FnOnce(DashError) -> DashError {
    move |e| match e {
        DashError::NotFound(_) => DashError::NotFound(format!("dataset {id}")),
        other => other,
    }
}

#[async_trait]
impl DatasetApi for DatasetGateway {
    async fn list(&self) -> Result<DatasetListing> {
        debug!(target: "gateway", "Listing datasets");
        self.http.send_json(ApiRequest::get("/datasets/user")).await
    }

    async fn get(&self, id: DatasetId) -> Result<Dataset> {
        self.http
            .send_json(ApiRequest::get(format!("/datasets/{id}")))
            .await
            .map_err(dataset_not_found(id))
    }

    async fn upload(&self, file: UploadFile, on_progress: Option<ProgressFn>) -> Result<Dataset> {
        file.validate(self.max_upload_bytes)?;

        let name = file.file_name().to_string();
        let size = file.size();
        info!(target: "upload", file = %name, size, "Uploading dataset");

        let tracker = on_progress.map(|cb| Arc::new(ProgressTracker::from_boxed(cb)));
        let request = ApiRequest::post("/datasets/upload").multipart(file.into_multipart(tracker));

        let response = self.http.send(request).await.map_err(|e| match e {
            DashError::Server { message, status } => {
                warn!(target: "upload", file = %name, status, "Upload rejected by server");
                DashError::Upload(message.unwrap_or_else(|| "Upload failed".to_string()))
            }
            DashError::NotFound(_) => DashError::Upload("Upload failed".to_string()),
            other => other,
        })?;

        let dataset: Dataset = response.parse()?;
        info!(target: "upload", id = dataset.id, status = %dataset.status, "Dataset uploaded");
        Ok(dataset)
    }

    async fn columns(&self, id: DatasetId) -> Result<Vec<DatasetColumn>> {
        let mut columns: Vec<DatasetColumn> = self
            .http
            .send_json(ApiRequest::get(format!("/datasets/{id}/columns")))
            .await
            .map_err(dataset_not_found(id))?;
        columns.sort_by_key(|c| c.column_index);
        for column in &mut columns {
            column.dataset_id = Some(id);
        }
        Ok(columns)
    }

    async fn preview(&self, id: DatasetId, limit: usize) -> Result<Vec<PreviewRow>> {
        let request = ApiRequest::get(format!("/datasets/{id}/preview")).query("limit", limit);
        let mut rows: Vec<PreviewRow> = self
            .http
            .send_json(request)
            .await
            .map_err(dataset_not_found(id))?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn download_url(&self, id: DatasetId) -> Result<DownloadLink> {
        self.http
            .send_json(ApiRequest::get(format!("/datasets/{id}/download")))
            .await
            .map_err(dataset_not_found(id))
    }

    async fn remove(&self, id: DatasetId) -> Result<()> {
        self.http
            .send(ApiRequest::delete(format!("/datasets/{id}")))
            .await
            .map_err(dataset_not_found(id))?;
        info!(target: "gateway", id, "Dataset deleted");
        Ok(())
    }
}
