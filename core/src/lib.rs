// Datadash Core Library
// Client runtime for the tabular dataset dashboard

pub mod api;
pub mod config;
pub mod format;
pub mod forms;
pub mod http;
pub mod session;
pub mod store;
pub mod views;

// Export core types
pub use api::{
    AuthApi, AuthGateway, DatasetApi, DatasetGateway, UploadFile, UserGateway,
};
pub use config::ClientConfig;
pub use forms::FieldErrors;
pub use http::{AuthFailureHandler, HttpClient};
pub use session::Session;
pub use store::{DatasetState, DatasetStore, FetchOutcome, StorePhase};

use std::sync::Arc;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Session expired")]
    AuthExpired,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DashError {
    /// Message suitable for showing to a user.
    ///
    /// Prefers the backend's own `message`/`error` text and falls back to
    /// `fallback` for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            DashError::Server {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            DashError::Upload(m) | DashError::UploadRejected(m) => m.clone(),
            DashError::Validation(errors) => errors.to_string(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

/// Client runtime: one HTTP client shared by every gateway, plus the
/// session-lifetime dataset store.
pub struct Dashboard {
    pub config: ClientConfig,
    pub http: HttpClient,
    pub datasets: DatasetStore,
    pub users: UserGateway,
    pub session: Session,
}

impl Dashboard {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::from_config(&config)?;
        Ok(Self::with_http(config, http))
    }

    /// Same as [`Dashboard::new`] but with a custom hook for unrecoverable
    /// session expiry.
    pub fn with_failure_handler(
        config: ClientConfig,
        handler: Arc<dyn AuthFailureHandler>,
    ) -> Result<Self> {
        let http = HttpClient::from_config_with_handler(&config, handler)?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: ClientConfig, http: HttpClient) -> Self {
        let gateway = DatasetGateway::new(http.clone(), config.max_upload_bytes);
        let datasets =
            DatasetStore::new(Arc::new(gateway)).with_cache_duration(config.cache_duration());
        let auth = AuthGateway::new(http.clone());
        let session = Session::new(Arc::new(auth), datasets.clone());

        tracing::info!(base_url = %config.base_url, "Dashboard client initialized");

        Self {
            users: UserGateway::new(http.clone()),
            config,
            http,
            datasets,
            session,
        }
    }
}
