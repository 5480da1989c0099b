//! Client configuration loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration shared by the HTTP adapter, the gateways and the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, e.g. http://localhost:8080/api
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Staleness window of the dataset list cache
    pub cache_ttl_ms: u64,
    /// Default number of rows requested by dataset previews
    pub preview_limit: usize,
    pub max_upload_bytes: u64,
    /// Where an unrecoverable session expiry sends the user
    pub login_path: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DATADASH_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30_000),
            cache_ttl_ms: std::env::var("DATASET_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_MS),
            preview_limit: std::env::var("PREVIEW_LIMIT")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PREVIEW_LIMIT),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            login_path: std::env::var("LOGIN_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "/login".to_string()),
            user_agent: std::env::var("USER_AGENT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "datadash-client/0.1".to_string()),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
