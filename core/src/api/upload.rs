use crate::format::format_file_size;
use crate::http::{MultipartFile, ProgressTracker};
use crate::{DashError, Result};
use std::path::Path;
use std::sync::Arc;

/// File extensions the backend accepts
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Multipart form field carrying the file
const UPLOAD_FIELD: &str = "file";

/// A file staged for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    bytes: Arc<Vec<u8>>,
}

impl UploadFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DashError::UploadRejected(format!("Not a file: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("csv") => "text/csv",
            Some("xls") => "application/vnd.ms-excel",
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            _ => "application/octet-stream",
        }
    }

    /// Client-side checks mirrored from the backend: file type, emptiness
    /// and size limit.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        let accepted = self
            .extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
        if !accepted {
            return Err(DashError::UploadRejected(
                "Invalid file type. Only CSV and Excel files are allowed.".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(DashError::UploadRejected("File is empty".to_string()));
        }
        if self.size() > max_bytes {
            return Err(DashError::UploadRejected(format!(
                "File size exceeds {} limit",
                format_file_size(max_bytes)
            )));
        }
        Ok(())
    }

    pub(crate) fn into_multipart(self, progress: Option<Arc<ProgressTracker>>) -> MultipartFile {
        MultipartFile {
            field: UPLOAD_FIELD.to_string(),
            content_type: self.content_type().to_string(),
            file_name: self.file_name,
            bytes: self.bytes,
            progress,
        }
    }
}
