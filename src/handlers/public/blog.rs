use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::database::models::{Post, Tenant};
use crate::database::repos::PublishedSort;
use crate::error::ApiError;
use crate::services::{clamp_paging, Page};
use crate::state::AppState;
use crate::text;

use super::cache_for_minutes;

/// Public view of a post: the row plus derived read metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    #[serde(flatten)]
    pub post: Post,
    pub read_time: u32,
    pub comments_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PublicPostsQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagsQuery {
    pub query: Option<String>,
}

/// GET /api/public/tenants/:tenant_slug
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_slug): Path<String>,
) -> Result<(HeaderMap, Json<Tenant>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    Ok((cache_for_minutes(30), Json(tenant)))
}

/// GET /api/public/tenants/:tenant_slug/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Path(tenant_slug): Path<String>,
    Query(query): Query<PublicPostsQuery>,
) -> Result<(HeaderMap, Json<Page<PublicPost>>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let (page, size) = clamp_paging(query.page, query.size, 50);
    let sort = match query.sort.as_deref() {
        Some("views") => PublishedSort::Views,
        _ => PublishedSort::PublishedAt,
    };

    let posts = state
        .posts()
        .published_page(
            tenant.id,
            query.tag.as_deref(),
            query.author.as_deref(),
            query.q.as_deref(),
            sort,
            page,
            size,
        )
        .await?;

    let mut content = Vec::with_capacity(posts.content.len());
    for post in posts.content {
        content.push(public_view(&state, post).await?);
    }
    let page = Page {
        content,
        page: posts.page,
        size: posts.size,
        total_elements: posts.total_elements,
        total_pages: posts.total_pages,
    };

    Ok((cache_for_minutes(5), Json(page)))
}

/// GET /api/public/tenants/:tenant_slug/posts/:slug
pub async fn get_post(
    State(state): State<AppState>,
    Path((tenant_slug, slug)): Path<(String, String)>,
) -> Result<(HeaderMap, Json<PublicPost>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let post = state
        .posts()
        .public_post(tenant.id, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let view = public_view(&state, post).await?;
    Ok((cache_for_minutes(10), Json(view)))
}

/// GET /api/public/tenants/:tenant_slug/posts/:slug/related
pub async fn related_posts(
    State(state): State<AppState>,
    Path((tenant_slug, slug)): Path<(String, String)>,
) -> Result<(HeaderMap, Json<Vec<PublicPost>>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let related = state.posts().related(tenant.id, &slug, 3).await?;

    let mut views = Vec::with_capacity(related.len());
    for post in related {
        views.push(public_view(&state, post).await?);
    }
    Ok((cache_for_minutes(15), Json(views)))
}

/// GET /api/public/tenants/:tenant_slug/tags
pub async fn popular_tags(
    State(state): State<AppState>,
    Path(tenant_slug): Path<String>,
    Query(query): Query<TagsQuery>,
) -> Result<(HeaderMap, Json<Vec<String>>), ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let tags = state
        .posts()
        .popular_tags(tenant.id, query.query.as_deref(), 20)
        .await?;
    Ok((cache_for_minutes(10), Json(tags)))
}

pub(crate) async fn resolve_tenant(
    state: &AppState,
    tenant_slug: &str,
) -> Result<Tenant, ApiError> {
    state
        .tenants()
        .find_by_slug(tenant_slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))
}

async fn public_view(state: &AppState, post: Post) -> Result<PublicPost, ApiError> {
    let comments_count = state
        .comments()
        .approved_for_post(post.tenant_id, post.id)
        .await?
        .len() as i64;
    let read_time = text::read_time_minutes(post.body_html.as_deref().unwrap_or(""));

    Ok(PublicPost {
        post,
        read_time,
        comments_count,
    })
}
