use super::progress::ProgressTracker;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A single file sent as one multipart field
#[derive(Debug, Clone)]
pub struct MultipartFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Arc<Vec<u8>>,
    /// Shared across re-sends so reported progress never goes backwards
    pub progress: Option<Arc<ProgressTracker>>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartFile),
}

/// Transport-neutral description of one outgoing call.
///
/// `retried` is per-request metadata used by the session-refresh middleware;
/// it is never shared between requests.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn multipart(mut self, file: MultipartFile) -> Self {
        self.body = RequestBody::Multipart(file);
        self
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Error text the backend attached to a failed response: the `message`
    /// or `error` field of a JSON body, or a short plain-text body.
    pub fn server_message(&self) -> Option<String> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => ["message", "error"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
                .map(|s| s.to_string()),
            Ok(Value::String(s)) => Some(s),
            Ok(_) => None,
            Err(_) => {
                let text = String::from_utf8_lossy(&self.body).trim().to_string();
                (!text.is_empty() && !text.starts_with('<')).then_some(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_prefers_message_field() {
        let resp = ApiResponse::json(500, &json!({"message": "boom", "error": "other"}));
        assert_eq!(resp.server_message().as_deref(), Some("boom"));

        let resp = ApiResponse::json(400, &json!({"error": "File is empty"}));
        assert_eq!(resp.server_message().as_deref(), Some("File is empty"));
    }

    #[test]
    fn server_message_reads_plain_text() {
        let resp = ApiResponse::new(401, "Invalid or expired refresh token");
        assert_eq!(
            resp.server_message().as_deref(),
            Some("Invalid or expired refresh token")
        );
        assert_eq!(ApiResponse::new(502, "<html>bad gateway</html>").server_message(), None);
        assert_eq!(ApiResponse::empty(500).server_message(), None);
    }

    #[test]
    fn empty_body_parses_as_null() {
        let v: Option<String> = ApiResponse::empty(204).parse().unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn builder_collects_query_and_json() {
        let req = ApiRequest::get("/datasets/1/preview").query("limit", 5);
        assert_eq!(req.query, vec![("limit".to_string(), "5".to_string())]);
        assert!(!req.is_retried());

        let req = ApiRequest::post("/auth/login")
            .json(&json!({"email": "a@b.co"}))
            .unwrap();
        assert!(matches!(req.body, RequestBody::Json(_)));
    }
}
