use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::auth_service::AuthResponse;
use crate::services::tenant_service::SlugCheck;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub blog_name: String,
    pub blog_slug: String,
}

/// GET /api/tenants/check-slug/:slug
pub async fn check_slug(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<SlugCheck>, ApiError> {
    let check = state.tenants().check_slug(&slug).await?;
    Ok(Json(check))
}

/// POST /api/tenants - creates a blog and reissues a token scoped to it.
pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = state
        .tenants()
        .create_tenant_for_user(auth.user_id, &request.blog_name, &request.blog_slug)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
