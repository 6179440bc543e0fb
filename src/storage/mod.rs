// Object storage backends for uploaded media.
use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

/// Where uploaded bytes end up. The media service only ever talks to this
/// trait, so tests can swap in an in-memory store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the bytes under `key` and returns the public URL.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// S3-backed store used by the media library.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub async fn from_env(bucket: String, public_base_url: String) -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&aws_config),
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        debug!(key, bucket = %self.bucket, "stored object");
        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }
}

/// Filesystem store backing the legacy single-image upload endpoint.
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: String) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalDiskStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Maps a filename extension to the content type we serve it back with.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_matches_extension() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn local_disk_round_trip() {
        let dir = std::env::temp_dir().join(format!("media-test-{}", uuid::Uuid::new_v4()));
        let store = LocalDiskStorage::new(&dir, "http://localhost:3000/uploads".to_string());

        let url = store
            .put("t1/file.png", b"png-bytes".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/uploads/t1/file.png");
        assert_eq!(
            tokio::fs::read(dir.join("t1/file.png")).await.unwrap(),
            b"png-bytes"
        );

        store.delete("t1/file.png").await.unwrap();
        // Deleting again is a no-op, not an error.
        store.delete("t1/file.png").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
