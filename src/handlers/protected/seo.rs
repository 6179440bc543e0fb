use axum::extract::{Path, State};
use axum::response::Json;
use axum::Extension;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::SeoSettings;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::scoped_tenant;

/// GET /api/tenants/:tenant_id/seo
pub async fn get_seo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<SeoSettings>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let seo = state.tenants().seo_settings(tenant_id, auth.user_id).await?;
    Ok(Json(seo))
}

/// PUT /api/tenants/:tenant_id/seo
pub async fn update_seo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Json(seo): Json<SeoSettings>,
) -> Result<Json<SeoSettings>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let seo = state
        .tenants()
        .update_seo_settings(tenant_id, auth.user_id, seo)
        .await?;
    Ok(Json(seo))
}

/// POST /api/tenants/:tenant_id/seo/preview - renders search and social
/// cards for settings that may not be saved yet.
pub async fn preview_seo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Json(seo): Json<SeoSettings>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let preview = state.tenants().seo_preview(tenant_id, &seo).await?;
    Ok(Json(preview))
}
