use super::auth_retry::{AuthFailureHandler, AuthRetry};
use super::request::{ApiRequest, ApiResponse};
use super::transport::{ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::{DashError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// Shared client used by every gateway.
///
/// Successful (2xx) responses pass through; everything else is mapped onto
/// the crate error taxonomy.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// reqwest transport wrapped in the session-refresh middleware
    pub fn from_config(cfg: &ClientConfig) -> Result<Self> {
        let transport = AuthRetry::new(ReqwestTransport::new(cfg)?, cfg.login_path.clone());
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn from_config_with_handler(
        cfg: &ClientConfig,
        handler: Arc<dyn AuthFailureHandler>,
    ) -> Result<Self> {
        let transport = AuthRetry::new(ReqwestTransport::new(cfg)?, cfg.login_path.clone())
            .with_failure_handler(handler);
        Ok(Self::new(Arc::new(transport)))
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.transport.execute(&request).await?;
        check_status(&request, response)
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.parse()
    }
}

fn check_status(request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(
        target: "http",
        method = request.method.as_str(),
        path = %request.path,
        status = response.status,
        "Request returned error status"
    );
    Err(match response.status {
        401 => DashError::AuthExpired,
        404 => DashError::NotFound(request.path.clone()),
        status => DashError::Server {
            status,
            message: response.server_message(),
        },
    })
}
