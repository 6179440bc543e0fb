use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;

use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::auth::optional_auth_user;
use crate::services::comment_service::CommentInput;
use crate::state::AppState;

use super::blog::resolve_tenant;
use super::cache_for_minutes;

/// GET /api/public/tenants/:tenant_slug/posts/:slug/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path((tenant_slug, slug)): Path<(String, String)>,
) -> Result<(HeaderMap, Json<Vec<Comment>>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let post = state
        .posts()
        .find_published_by_slug(tenant.id, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let comments = state.comments().approved_for_post(tenant.id, post.id).await?;
    Ok((cache_for_minutes(2), Json(comments)))
}

/// POST /api/public/tenants/:tenant_slug/posts/:slug/comments
///
/// A valid bearer token makes the comment land approved; anonymous
/// submissions wait for moderation.
pub async fn create_comment(
    State(state): State<AppState>,
    Path((tenant_slug, slug)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let post = state
        .posts()
        .find_published_by_slug(tenant.id, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let author_id = optional_auth_user(&headers).map(|user| user.user_id);
    let comment = state
        .comments()
        .create(tenant.id, post.id, input, author_id)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
