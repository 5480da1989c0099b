//! HTTP module: request model, transport, and the session-refresh middleware
//!
//! This module provides:
//! - `ApiRequest` / `ApiResponse`, the transport-neutral exchange types
//! - `Transport` and its reqwest implementation `ReqwestTransport`
//! - `AuthRetry`, which retries a request once after refreshing an expired session
//! - `HttpClient`, which maps response statuses onto `DashError`

mod auth_retry;
mod client;
mod progress;
mod request;
mod transport;

pub use auth_retry::{AuthFailureHandler, AuthRetry, LogRedirect, REFRESH_PATH};
pub use client::HttpClient;
pub use progress::{ProgressFn, ProgressTracker};
pub use request::{ApiRequest, ApiResponse, Method, MultipartFile, RequestBody};
pub use transport::{ReqwestTransport, Transport, UPLOAD_CHUNK_BYTES};
