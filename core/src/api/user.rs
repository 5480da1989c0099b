use crate::http::{ApiRequest, HttpClient};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPrefs {
    pub auto_delete: bool,
    pub auto_delete_days: u32,
    /// Upload size limit in MB
    pub max_file_size: u32,
    pub default_chart_type: String,
}

impl Default for DatasetPrefs {
    fn default() -> Self {
        Self {
            auto_delete: false,
            auto_delete_days: 30,
            max_file_size: 50,
            default_chart_type: "bar".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPrefs {
    pub upload_complete: bool,
    pub upload_failed: bool,
    pub weekly_report: bool,
    pub storage_warning: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            upload_complete: true,
            upload_failed: true,
            weekly_report: false,
            storage_warning: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_prefs: Option<DatasetPrefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_prefs: Option<NotificationPrefs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub dataset_prefs: DatasetPrefs,
    pub notification_prefs: NotificationPrefs,
}

/// Profile and account endpoints
#[derive(Clone)]
pub struct UserGateway {
    http: HttpClient,
}

impl UserGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.http.send_json(ApiRequest::get("/user/profile")).await
    }

    pub async fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        self.http
            .send(ApiRequest::put("/user/profile").json(profile)?)
            .await?;
        info!(target: "gateway", "Profile updated");
        Ok(())
    }

    pub async fn update_preferences(&self, prefs: &PreferencesUpdate) -> Result<()> {
        self.http
            .send(ApiRequest::put("/user/preferences").json(prefs)?)
            .await?;
        info!(target: "gateway", "Preferences updated");
        Ok(())
    }

    pub async fn delete_account(&self) -> Result<()> {
        self.http.send(ApiRequest::delete("/user/account")).await?;
        info!(target: "gateway", "Account deleted");
        Ok(())
    }
}
