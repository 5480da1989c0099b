use std::fs;
use std::path::Path;

use datadash_core::views::{SortKey, TypeFilter};
use datadash_core::ClientConfig;

/// Settings for the CLI: the core client config plus list defaults
#[derive(Clone, Debug, Default)]
pub struct DashboardConfig {
    pub client: ClientConfig,
    pub list: ListDefaults,
}

/// Used when `list` is run without `--sort` / `--type`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListDefaults {
    pub sort: SortKey,
    pub file_type: TypeFilter,
}

impl DashboardConfig {
    /// Load configuration from a TOML file (path via DASHBOARD_CONFIG or ./dashboard.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::debug!(target: "dashboard_cli", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => Self::from_toml(&s, default),
            Err(e) => {
                tracing::warn!(target: "dashboard_cli", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    fn from_toml(raw: &str, default: Self) -> Self {
        match toml::from_str::<DashboardToml>(raw) {
            Ok(t) => t.overlay(default),
            Err(e) => {
                tracing::warn!(target: "dashboard_cli", error = %e, "Failed to parse TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct DashboardToml {
    pub api: Option<ApiToml>,
    pub list: Option<ListToml>,
}

impl DashboardToml {
    fn overlay(self, mut base: DashboardConfig) -> DashboardConfig {
        if let Some(a) = self.api {
            a.apply(&mut base.client);
        }
        if let Some(l) = self.list {
            l.apply(&mut base.list);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ApiToml {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub cache_ttl_ms: Option<u64>,
    pub preview_limit: Option<usize>,
    pub max_upload_mb: Option<u64>,
    pub login_path: Option<String>,
}
impl ApiToml {
    fn apply(self, c: &mut ClientConfig) {
        if let Some(x) = self.base_url.filter(|s| !s.is_empty()) {
            c.base_url = x;
        }
        if let Some(x) = self.request_timeout_ms {
            c.request_timeout_ms = x;
        }
        if let Some(x) = self.cache_ttl_ms {
            c.cache_ttl_ms = x;
        }
        if let Some(x) = self.preview_limit.filter(|n| *n > 0) {
            c.preview_limit = x;
        }
        if let Some(x) = self.max_upload_mb {
            c.max_upload_bytes = x.saturating_mul(1024 * 1024);
        }
        if let Some(x) = self.login_path {
            c.login_path = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ListToml {
    pub sort: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}
impl ListToml {
    fn apply(self, l: &mut ListDefaults) {
        if let Some(x) = self.sort {
            match x.parse() {
                Ok(sort) => l.sort = sort,
                Err(e) => tracing::warn!(target: "dashboard_cli", error = %e, "Ignoring list.sort"),
            }
        }
        if let Some(x) = self.file_type {
            match x.parse() {
                Ok(filter) => l.file_type = filter,
                Err(e) => tracing::warn!(target: "dashboard_cli", error = %e, "Ignoring list.type"),
            }
        }
    }
}
