use super::progress::ProgressTracker;
use super::request::{ApiRequest, ApiResponse, Method, MultipartFile, RequestBody};
use crate::config::ClientConfig;
use crate::{DashError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Size of each streamed multipart chunk; progress is reported per chunk
pub const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Executes one request/response exchange.
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// complete the exchange at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport carrying session cookies between calls
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(&cfg.user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| DashError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        debug!(
            target: "http",
            method = request.method.as_str(),
            url = %url,
            retried = request.is_retried(),
            "Sending request"
        );

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.http.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(file) => builder.multipart(multipart_form(file)?),
        };

        let response = builder.send().await.map_err(|e| {
            warn!(target: "http", url = %url, error = %e, "Request failed");
            DashError::Network(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!(target: "http", url = %url, error = %e, "Failed to read response body");
            DashError::Network(format!("Failed to read response body: {e}"))
        })?;

        debug!(target: "http", url = %url, status, "Response received");
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn multipart_form(file: &MultipartFile) -> Result<Form> {
    let total = file.bytes.len() as u64;
    let stream = chunked_upload(Arc::clone(&file.bytes), file.progress.clone());
    let part = Part::stream_with_length(Body::wrap_stream(stream), total)
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| DashError::Config(format!("Invalid content type {}: {e}", file.content_type)))?;
    Ok(Form::new().part(file.field.clone(), part))
}

/// Stream `bytes` in fixed-size chunks, reporting progress after each chunk
/// has been taken by the consumer and 100% once the body is exhausted.
pub(crate) fn chunked_upload(
    bytes: Arc<Vec<u8>>,
    progress: Option<Arc<ProgressTracker>>,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
    async_stream::stream! {
        let total = bytes.len() as u64;
        let mut sent = 0u64;
        for chunk in bytes.chunks(UPLOAD_CHUNK_BYTES) {
            yield Ok::<Vec<u8>, std::io::Error>(chunk.to_vec());
            sent += chunk.len() as u64;
            if let Some(p) = &progress {
                p.report(sent, total);
            }
        }
        if let Some(p) = &progress {
            p.finish();
        }
    }
}
