use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::database::models::Media;
use crate::database::repos::MediaRepository;
use crate::services::{Page, ServiceError};
use crate::storage::ObjectStore;

pub struct MediaService {
    repo: MediaRepository,
    store: Arc<dyn ObjectStore>,
}

impl MediaService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            repo: MediaRepository::new(pool),
            store,
        }
    }

    /// Library upload: images and video up to the configured limit, stored
    /// remotely under a tenant-scoped key.
    pub async fn upload(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        original_filename: Option<String>,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<Media, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::validation("File is empty"));
        }
        let max = config::config().media.library_max_bytes;
        if bytes.len() > max {
            return Err(ServiceError::validation("File size exceeds 10MB limit"));
        }
        if !content_type.starts_with("image/") && !content_type.starts_with("video/") {
            return Err(ServiceError::validation(
                "Only image and video files are allowed",
            ));
        }

        let is_image = content_type.starts_with("image/");
        let dimensions = if is_image {
            image_dimensions(&bytes)
        } else {
            None
        };

        let storage_key = format!("{tenant_id}/{}", Uuid::new_v4());
        let size = bytes.len() as i64;
        let url = self.store.put(&storage_key, bytes, &content_type).await?;

        let thumbnail_url = is_image.then(|| format!("{url}?width=300&height=300&fit=crop"));

        let media = Media {
            id: Uuid::nil(),
            tenant_id,
            uploaded_by: user_id,
            url,
            thumbnail_url,
            filename: display_filename(original_filename.as_deref()),
            original_filename,
            mime_type: content_type,
            size,
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            storage_key,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let media = self.repo.insert(&media).await?;
        info!(media_id = %media.id, size, "media uploaded");
        Ok(media)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        kind: Option<&str>,
        page: i64,
        size: i64,
    ) -> Result<Page<Media>, ServiceError> {
        let mime_prefix = match kind {
            Some("image") => Some("image/"),
            _ => None,
        };
        let (items, total) = self.repo.list(tenant_id, mime_prefix, page, size).await?;
        Ok(Page::new(items, page, size, total))
    }

    pub async fn get(&self, tenant_id: Uuid, media_id: Uuid) -> Result<Media, ServiceError> {
        self.repo
            .find_in_tenant(tenant_id, media_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Media not found"))
    }

    /// Only the uploader may rename their files.
    pub async fn rename(
        &self,
        tenant_id: Uuid,
        media_id: Uuid,
        user_id: Uuid,
        new_filename: &str,
    ) -> Result<Media, ServiceError> {
        let media = self.get(tenant_id, media_id).await?;
        if media.uploaded_by != user_id {
            return Err(ServiceError::forbidden(
                "Unauthorized to update this media",
            ));
        }
        if new_filename.trim().is_empty() {
            return Err(ServiceError::validation("Filename is required"));
        }

        self.repo
            .update_filename(tenant_id, media_id, new_filename.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("Media not found"))
    }

    /// Deletes the remote object first; the database row only goes away
    /// once the stored bytes are gone.
    pub async fn delete(
        &self,
        tenant_id: Uuid,
        media_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        let media = self.get(tenant_id, media_id).await?;
        if media.uploaded_by != user_id {
            return Err(ServiceError::forbidden(
                "Unauthorized to delete this media",
            ));
        }

        self.store.delete(&media.storage_key).await?;
        self.repo.delete(tenant_id, media_id).await?;
        info!(media_id = %media_id, "media deleted");
        Ok(())
    }
}

/// Display name: original name without its extension, unsafe chars
/// replaced.
fn display_filename(original: Option<&str>) -> String {
    let Some(original) = original else {
        return "untitled".to_string();
    };

    let stem = match original.rfind('.') {
        Some(idx) if idx > 0 => &original[..idx],
        _ => original,
    };
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

fn image_dimensions(bytes: &[u8]) -> Option<(i32, i32)> {
    image::load_from_memory(bytes)
        .ok()
        .map(|img| (img.width() as i32, img.height() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_strips_extension_and_unsafe_chars() {
        assert_eq!(display_filename(Some("My Photo (1).jpg")), "My_Photo__1_");
        assert_eq!(display_filename(Some("clean-name.png")), "clean-name");
        assert_eq!(display_filename(Some(".hidden")), ".hidden");
        assert_eq!(display_filename(None), "untitled");
    }

    #[test]
    fn dimensions_of_garbage_are_none() {
        assert!(image_dimensions(b"not an image").is_none());
    }
}
