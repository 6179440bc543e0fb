use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::scoped_tenant;

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/tenants/:tenant_id/tags - tag autocomplete for the editor.
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<TagQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let tags = state
        .posts()
        .popular_tags(tenant_id, query.query.as_deref(), limit)
        .await?;
    Ok(Json(tags))
}
