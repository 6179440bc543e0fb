use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Post, PostStatus};
use crate::database::repos::PostFilter;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::post_service::PostInput;
use crate::services::{clamp_paging, Page};
use crate::state::AppState;

use super::scoped_tenant;

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<PostStatus>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugAvailability {
    pub available: bool,
    pub suggestions: Vec<String>,
}

/// POST /api/tenants/:tenant_id/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let post = state.posts().create(tenant_id, auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/tenants/:tenant_id/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Page<Post>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let (page, size) = clamp_paging(query.page, query.size, 50);
    let filter = PostFilter {
        status: query.status,
        tag: query.tag,
        category: query.category,
        author: query.author,
    };
    let posts = state.posts().list(tenant_id, filter, page, size).await?;
    Ok(Json(posts))
}

/// GET /api/tenants/:tenant_id/posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Post>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let post = state.posts().get(tenant_id, post_id).await?;
    Ok(Json(post))
}

/// GET /api/tenants/:tenant_id/posts/slug/:slug
///
/// Used by the editor preview; counts a view like the public route does.
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, slug)): Path<(Uuid, String)>,
) -> Result<Json<Post>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let post = state.posts().get_by_slug(tenant_id, &slug).await?;
    Ok(Json(post))
}

/// PUT /api/tenants/:tenant_id/posts/:post_id
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, post_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let post = state
        .posts()
        .update(tenant_id, post_id, auth.user_id, input)
        .await?;
    Ok(Json(post))
}

/// DELETE /api/tenants/:tenant_id/posts/:post_id
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state
        .posts()
        .delete(tenant_id, post_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tenants/:tenant_id/posts/check-slug/:slug
pub async fn check_slug(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, slug)): Path<(Uuid, String)>,
) -> Result<Json<SlugAvailability>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let taken = state.posts().slug_taken(tenant_id, &slug).await?;
    let suggestions = if taken {
        state.posts().slug_suggestions(tenant_id, &slug).await?
    } else {
        vec![]
    };
    Ok(Json(SlugAvailability {
        available: !taken,
        suggestions,
    }))
}
