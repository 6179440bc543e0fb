use std::path::PathBuf;

use axum::extract::Path;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::storage::content_type_for;

/// GET /api/media/:tenant_id/:filename - serves legacy local-disk uploads.
pub async fn serve_legacy_file(
    Path((tenant_id, filename)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    // Filenames are flat UUID-based names; anything that looks like a path
    // is rejected outright.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::not_found("File not found"));
    }

    let mut path = PathBuf::from(&config::config().media.legacy_upload_dir);
    path.push(tenant_id.to_string());
    path.push(&filename);

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(content_type_for(&filename)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    // Uploaded files never change in place, so let clients cache for a year.
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000"),
    );

    Ok((headers, bytes))
}
