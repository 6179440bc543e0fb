use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Notification;
use crate::error::ApiError;
use crate::handlers::PagingQuery;
use crate::middleware::auth::AuthUser;
use crate::services::{clamp_paging, Page};
use crate::state::AppState;

use super::scoped_tenant;

/// GET /api/tenants/:tenant_id/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<PagingQuery>,
) -> Result<Json<Page<Notification>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let (page, size) = clamp_paging(query.page, query.size.or(Some(20)), 100);
    let notifications = state
        .notifications()
        .list(tenant_id, auth.user_id, page, size)
        .await?;
    Ok(Json(notifications))
}

/// GET /api/tenants/:tenant_id/notifications/recent
pub async fn recent_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let notifications = state
        .notifications()
        .recent(tenant_id, auth.user_id)
        .await?;
    Ok(Json(notifications))
}

/// GET /api/tenants/:tenant_id/notifications/unread
pub async fn unread_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let notifications = state
        .notifications()
        .unread(tenant_id, auth.user_id)
        .await?;
    Ok(Json(notifications))
}

/// GET /api/tenants/:tenant_id/notifications/unread/count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let count = state
        .notifications()
        .unread_count(tenant_id, auth.user_id)
        .await?;
    Ok(Json(json!({ "count": count })))
}

/// PUT /api/tenants/:tenant_id/notifications/:notification_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, notification_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Notification>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let notification = state
        .notifications()
        .mark_read(tenant_id, auth.user_id, notification_id)
        .await?;
    Ok(Json(notification))
}

/// PUT /api/tenants/:tenant_id/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let updated = state
        .notifications()
        .mark_all_read(tenant_id, auth.user_id)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

/// DELETE /api/tenants/:tenant_id/notifications/:notification_id
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((tenant_id, notification_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    state
        .notifications()
        .delete(tenant_id, auth.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/tenants/:tenant_id/notifications/all
pub async fn delete_all_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tenant_id = scoped_tenant(&auth, tenant_id)?;
    let deleted = state
        .notifications()
        .delete_all(tenant_id, auth.user_id)
        .await?;
    Ok(Json(json!({ "deleted": deleted })))
}
