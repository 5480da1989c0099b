use crate::http::{ApiRequest, HttpClient};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Signed-in user as reported by the auth endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Session lifecycle endpoints; the session itself lives in cookies
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse>;
    async fn logout(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct AuthGateway {
    http: HttpClient,
}

impl AuthGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AuthApi for AuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .http
            .send_json(ApiRequest::post("/auth/login").json(request)?)
            .await?;
        info!(target: "gateway", email = %request.email, "Signed in");
        Ok(response)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .http
            .send_json(ApiRequest::post("/auth/register").json(request)?)
            .await?;
        info!(target: "gateway", email = %request.email, "Registered");
        Ok(response)
    }

    async fn logout(&self) -> Result<()> {
        self.http.send(ApiRequest::post("/auth/logout")).await?;
        info!(target: "gateway", "Signed out");
        Ok(())
    }
}
