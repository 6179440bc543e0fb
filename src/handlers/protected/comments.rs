use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use uuid::Uuid;

use crate::database::models::Comment;
use crate::error::ApiError;
use crate::handlers::PagingQuery;
use crate::middleware::auth::AuthUser;
use crate::services::comment_service::CommentInput;
use crate::services::{clamp_paging, Page};
use crate::state::AppState;

use super::scoped_tenant;

/// POST /api/tenants/:tenant_id/posts/:post_id/comments
///
/// Comments from authenticated members skip moderation.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, post_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let comment = state
        .comments()
        .create(tenant_id, post_id, input, Some(auth.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/tenants/:tenant_id/comments - moderation queue.
pub async fn pending_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<Page<Comment>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let (page, size) = clamp_paging(query.page, query.size, 50);
    let comments = state.comments().pending(tenant_id, page, size).await?;
    Ok(Json(comments))
}

/// PUT /api/tenants/:tenant_id/comments/:comment_id/approve
pub async fn approve_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state.comments().approve(tenant_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/tenants/:tenant_id/comments/:comment_id/reject
pub async fn reject_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state.comments().reject(tenant_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/tenants/:tenant_id/comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state.comments().delete(tenant_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
