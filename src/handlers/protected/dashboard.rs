use axum::extract::{Path, State};
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::PostStatus;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::scoped_tenant;

/// GET /api/tenants/:tenant_id/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;

    let posts = state.posts().all_by_tenant(tenant_id).await?;
    let published = posts
        .iter()
        .filter(|p| p.status == PostStatus::Published)
        .count();
    let total_views: i64 = posts.iter().map(|p| p.views).sum();

    let comments = state.comments().counts(tenant_id).await?;
    let unread = state
        .notifications()
        .unread_count(tenant_id, auth.user_id)
        .await?;

    Ok(Json(json!({
        "totalPosts": posts.len(),
        "publishedPosts": published,
        "draftPosts": posts.len() - published,
        "totalViews": total_views,
        "totalComments": comments.total,
        "pendingComments": comments.pending,
        "approvedComments": comments.approved,
        "unreadNotifications": unread,
    })))
}

/// GET /api/tenants/:tenant_id/dashboard/recent-activity
pub async fn recent_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;

    let recent_posts = state.posts().recent_published(tenant_id, 10).await?;
    let recent_notifications = state
        .notifications()
        .recent(tenant_id, auth.user_id)
        .await?;

    Ok(Json(json!({
        "recentPosts": recent_posts,
        "recentNotifications": recent_notifications,
    })))
}
