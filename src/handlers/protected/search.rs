use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::search_service::SearchResults;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// GET /api/search - unified search within the caller's tenant.
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError> {
    let tenant_id = auth.require_tenant()?;
    let limit = query.limit.unwrap_or(5);
    // Search is best-effort: an internal failure shows as no results, not
    // a broken search box.
    let results = match state.search().search(tenant_id, &query.q, limit).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, "search failed, returning empty results");
            SearchResults::empty()
        }
    };
    Ok(Json(results))
}
