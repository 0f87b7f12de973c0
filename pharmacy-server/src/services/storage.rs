//! Prescription image storage and text extraction seam
//!
//! Images land under `work_dir/uploads/prescriptions/<millis>_<name>` and are
//! served back by URL path. OCR is a trait with a no-op default; extraction
//! failure degrades to empty text and never fails the upload.

use std::path::{Path, PathBuf};

use shared::{AppError, ErrorCode};

/// Upload size cap (5 MiB, matching the multipart limit on the router)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Filesystem store for uploaded prescription images
#[derive(Debug, Clone)]
pub struct PrescriptionStore {
    uploads_dir: PathBuf,
}

impl PrescriptionStore {
    pub fn new(uploads_dir: PathBuf) -> Self {
        Self { uploads_dir }
    }

    /// Persist an uploaded image and return its URL path
    /// (`/uploads/prescriptions/<millis>_<name>`)
    pub async fn save_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::new(ErrorCode::FileTooLarge));
        }

        let file_name = format!(
            "{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let dir = self.uploads_dir.join("prescriptions");
        let path = dir.join(&file_name);

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_message(ErrorCode::FileStorageFailed, format!("mkdir failed: {e}"))
        })?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::with_message(ErrorCode::FileStorageFailed, format!("write failed: {e}"))
        })?;

        Ok(format!("/uploads/prescriptions/{file_name}"))
    }

    /// Absolute path of a stored image, given the URL path returned by
    /// [`save_image`](Self::save_image)
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let rel = url_path.strip_prefix("/uploads/")?;
        let path = self.uploads_dir.join(rel);
        // Reject anything that escapes the uploads directory
        if Path::new(rel)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(path)
    }
}

/// Keep only characters safe in a file name
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// OCR seam: extract text from a stored prescription image
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync + std::fmt::Debug {
    /// Best-effort extraction; implementations return empty text on failure
    async fn extract_text(&self, image_path: &Path) -> String;
}

/// Default extractor: no OCR backend, always empty text
#[derive(Debug, Default, Clone)]
pub struct NoopExtractor;

#[async_trait::async_trait]
impl TextExtractor for NoopExtractor {
    async fn extract_text(&self, image_path: &Path) -> String {
        tracing::debug!(path = %image_path.display(), "No OCR backend configured");
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("rx scan (1).png"), "rx_scan__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn save_and_resolve_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrescriptionStore::new(dir.path().to_path_buf());

        let url = store
            .save_image("scan.png", b"fake image bytes")
            .await
            .expect("save");
        assert!(url.starts_with("/uploads/prescriptions/"));
        assert!(url.ends_with("_scan.png"));

        let path = store.resolve(&url).expect("resolve");
        let bytes = tokio::fs::read(path).await.expect("read back");
        assert_eq!(bytes, b"fake image bytes");
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrescriptionStore::new(dir.path().to_path_buf());
        assert!(store.save_image("scan.png", b"").await.is_err());
    }
}
