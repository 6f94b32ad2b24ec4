// src/storage/mod.rs
//! Object storage for media uploaded from the editor.
//!
//! Uploads are stored under a timestamped key and referenced from page
//! content by URL.

use crate::error::AppError;
use crate::tree::Clock;
use crate::types::ObjectKey;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWriteExt};
use url::Url;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]")
        .expect("Failed to compile filename regex - this is a bug in the code");
}

const FALLBACK_FILENAME: &str = "upload";

/// A bucket of named objects reachable by URL.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Streams `body` into the object at `key`, returning the bytes stored.
    async fn put_stream(
        &self,
        key: &ObjectKey,
        body: &mut (dyn AsyncRead + Unpin + Send),
        content_type: &str,
    ) -> Result<u64, AppError>;

    /// Where readers fetch the object from.
    fn url_for(&self, key: &ObjectKey) -> Result<Url, AppError>;
}

/// Store backed by a local directory that a web server publishes.
///
/// Objects live at `{root_dir}/{bucket}/{key}` and are served from
/// `{public_base_url}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root_dir: PathBuf,
    public_base_url: Url,
    bucket: String,
}

impl LocalObjectStore {
    pub fn new(root_dir: impl Into<PathBuf>, public_base_url: Url, bucket: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base_url,
            bucket: bucket.into(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root_dir.join(&self.bucket)
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_stream(
        &self,
        key: &ObjectKey,
        body: &mut (dyn AsyncRead + Unpin + Send),
        content_type: &str,
    ) -> Result<u64, AppError> {
        let storage_error = |e: std::io::Error| AppError::Storage {
            key: key.to_string(),
            message: e.to_string(),
        };

        let dir = self.bucket_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(storage_error)?;

        let mut file = tokio::fs::File::create(dir.join(key.as_str()))
            .await
            .map_err(storage_error)?;
        let written = tokio::io::copy(body, &mut file).await.map_err(storage_error)?;
        file.flush().await.map_err(storage_error)?;

        log::debug!(
            "Stored {} bytes of {} as {}/{}",
            written,
            content_type,
            self.bucket,
            key
        );
        Ok(written)
    }

    fn url_for(&self, key: &ObjectKey) -> Result<Url, AppError> {
        let base = self.public_base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}/{}", base, self.bucket, key.as_str())).map_err(|e| {
            AppError::Storage {
                key: key.to_string(),
                message: format!("Cannot build public URL: {}", e),
            }
        })
    }
}

/// Reduces an uploaded filename to a safe ASCII name.
pub fn sanitize_filename(filename: &str) -> String {
    let joined = filename.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Key for an upload: `%Y%m%d%H%M%S` plus milliseconds, then the sanitized name.
pub fn object_key_for_upload(filename: &str, now: DateTime<Utc>) -> Result<ObjectKey, AppError> {
    let key = format!(
        "{}{:03}_{}",
        now.format("%Y%m%d%H%M%S"),
        now.timestamp_subsec_millis().min(999),
        sanitize_filename(filename)
    );
    Ok(ObjectKey::new(key)?)
}

/// Stores an uploaded file and returns the URL the editor should embed.
pub async fn upload_media(
    store: &dyn ObjectStore,
    clock: &dyn Clock,
    filename: &str,
    body: &mut (dyn AsyncRead + Unpin + Send),
    content_type: &str,
) -> Result<Url, AppError> {
    let key = object_key_for_upload(filename, clock.now())?;
    match store.put_stream(&key, body, content_type).await {
        Ok(_) => store.url_for(&key),
        Err(e) => {
            log::error!("Upload of {} failed: {}", filename, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ManualClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 45).unwrap() + chrono::Duration::milliseconds(7)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my photo.png"), "my_photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("résumé final.pdf"), "rsum_final.pdf");
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_object_key_is_timestamped() {
        let key = object_key_for_upload("diagram.svg", at_noon()).unwrap();
        assert_eq!(key.as_str(), "20240517123045007_diagram.svg");
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(
            dir.path(),
            Url::parse("https://media.example.com/").unwrap(),
            "uploads",
        );
        let clock = ManualClock::new(at_noon());

        let mut body: &[u8] = b"png bytes";
        let url = upload_media(&store, &clock, "shot.png", &mut body, "image/png")
            .await
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://media.example.com/uploads/20240517123045007_shot.png"
        );
        let stored = std::fs::read(dir.path().join("uploads/20240517123045007_shot.png")).unwrap();
        assert_eq!(stored, b"png bytes");
    }
}
