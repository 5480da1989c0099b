use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;
use crate::{DashError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Endpoint that renews the session cookie
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Invoked when a session cannot be refreshed; the web client's
/// equivalent is a hard redirect to the login page.
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self, login_path: &str);
}

/// Default handler: logs the redirect target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl AuthFailureHandler for LogRedirect {
    fn on_auth_failure(&self, login_path: &str) {
        warn!(target: "http", login_path = %login_path, "Session refresh failed; sign in again");
    }
}

/// Middleware that answers a 401 by refreshing the session once and
/// re-sending the original request once.
///
/// The retry flag travels with the request, so concurrent requests each get
/// their own single attempt and a retried request is never refreshed again.
pub struct AuthRetry<T> {
    inner: T,
    refresh_path: String,
    login_path: String,
    on_failure: Arc<dyn AuthFailureHandler>,
}

impl<T: Transport> AuthRetry<T> {
    pub fn new(inner: T, login_path: impl Into<String>) -> Self {
        Self {
            inner,
            refresh_path: REFRESH_PATH.to_string(),
            login_path: login_path.into(),
            on_failure: Arc::new(LogRedirect),
        }
    }

    pub fn with_failure_handler(mut self, handler: Arc<dyn AuthFailureHandler>) -> Self {
        self.on_failure = handler;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn refresh(&self) -> Result<()> {
        let mut refresh = ApiRequest::post(&self.refresh_path).json(&json!({}))?;
        // The refresh call itself must never trigger another refresh
        refresh.mark_retried();

        let response = self.inner.execute(&refresh).await?;
        if response.is_success() {
            return Ok(());
        }
        Err(DashError::AuthFailed(response.server_message().unwrap_or_else(
            || format!("session refresh returned status {}", response.status),
        )))
    }
}

#[async_trait]
impl<T: Transport> Transport for AuthRetry<T> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let response = self.inner.execute(request).await?;
        if response.status != 401 || request.is_retried() {
            return Ok(response);
        }

        info!(target: "http", path = %request.path, "Session expired; attempting refresh");
        let mut retry = request.clone();
        retry.mark_retried();

        match self.refresh().await {
            Ok(()) => {
                info!(target: "http", path = %request.path, "Session refreshed; retrying request");
                self.inner.execute(&retry).await
            }
            Err(e) => {
                warn!(target: "http", error = %e, "Session refresh failed");
                self.on_failure.on_auth_failure(&self.login_path);
                Err(match e {
                    DashError::AuthFailed(_) => e,
                    other => DashError::AuthFailed(other.to_string()),
                })
            }
        }
    }
}
