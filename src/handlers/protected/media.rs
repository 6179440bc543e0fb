use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;
use crate::database::models::Media;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::{clamp_paging, Page};
use crate::state::AppState;

use super::scoped_tenant;

#[derive(Debug, Deserialize)]
pub struct MediaListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub filename: String,
}

struct UploadedFile {
    filename: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

/// Pulls the `file` part out of a multipart body.
async fn read_file_part(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?
            .to_vec();
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    Err(ApiError::bad_request("Missing file field"))
}

/// POST /api/tenants/:tenant_id/media/upload - the media library.
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let file = read_file_part(&mut multipart).await?;

    let media = state
        .media()
        .upload(
            tenant_id,
            auth.user_id,
            file.filename,
            file.content_type,
            file.bytes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(media)))
}

/// GET /api/tenants/:tenant_id/media
pub async fn list_media(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<Page<Media>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let (page, size) = clamp_paging(query.page, query.size, 100);
    let media = state
        .media()
        .list(tenant_id, query.kind.as_deref(), page, size)
        .await?;
    Ok(Json(media))
}

/// GET /api/tenants/:tenant_id/media/:media_id
pub async fn get_media(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Media>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let media = state.media().get(tenant_id, media_id).await?;
    Ok(Json(media))
}

/// PUT /api/tenants/:tenant_id/media/:media_id
pub async fn rename_media(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, media_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Media>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let media = state
        .media()
        .rename(tenant_id, media_id, auth.user_id, &request.filename)
        .await?;
    Ok(Json(media))
}

/// DELETE /api/tenants/:tenant_id/media/:media_id
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state
        .media()
        .delete(tenant_id, media_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

const LEGACY_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// POST /api/tenants/:tenant_id/media-old/upload
///
/// Predecessor of the media library: single images to local disk, no
/// database row. Kept for clients that still link to /api/media URLs.
pub async fn upload_legacy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let file = read_file_part(&mut multipart).await?;

    if file.bytes.is_empty() {
        return Err(ApiError::validation("File is empty"));
    }
    if file.bytes.len() > config::config().media.legacy_max_bytes {
        return Err(ApiError::validation("File size exceeds 5MB limit"));
    }
    if !LEGACY_IMAGE_TYPES.contains(&file.content_type.as_str()) {
        return Err(ApiError::validation(
            "Only JPEG, PNG, GIF and WebP images are allowed",
        ));
    }

    let ext = file
        .filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    let stored_name = format!("{}{}", Uuid::new_v4(), ext);
    let key = format!("{tenant_id}/{stored_name}");

    let url = state
        .legacy_store
        .put(&key, file.bytes.clone(), &file.content_type)
        .await
        .map_err(|e| {
            tracing::error!("legacy upload failed: {}", e);
            ApiError::bad_gateway("Media storage temporarily unavailable")
        })?;

    Ok(Json(json!({
        "url": url,
        "filename": stored_name,
        "size": file.bytes.len(),
    })))
}

/// DELETE /api/tenants/:tenant_id/media-old/:filename
pub async fn delete_legacy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, filename)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::not_found("File not found"));
    }

    state
        .legacy_store
        .delete(&format!("{tenant_id}/{filename}"))
        .await
        .map_err(|e| {
            tracing::error!("legacy delete failed: {}", e);
            ApiError::bad_gateway("Media storage temporarily unavailable")
        })?;
    Ok(StatusCode::NO_CONTENT)
}
