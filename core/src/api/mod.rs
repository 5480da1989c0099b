//! Remote gateways: typed wrappers around the backend REST endpoints
//!
//! - `DatasetApi` / `DatasetGateway` for listing, fetching, uploading and deleting datasets
//! - `AuthApi` / `AuthGateway` for session lifecycle
//! - `UserGateway` for profile and account management
//!
//! Gateways shape requests and decode responses; they never cache.

mod auth;
mod datasets;
mod models;
mod upload;
mod user;

pub use auth::{AuthApi, AuthGateway, AuthResponse, LoginRequest, RegisterRequest, UserSummary};
pub use datasets::{DatasetApi, DatasetGateway};
pub use models::{
    CellValue, ColumnType, Dataset, DatasetColumn, DatasetId, DatasetListing, DatasetPatch,
    DatasetStatus, DownloadLink, PreviewRow,
};
pub use upload::{UploadFile, ACCEPTED_EXTENSIONS};
pub use user::{DatasetPrefs, NotificationPrefs, PreferencesUpdate, UserGateway, UserProfile};
