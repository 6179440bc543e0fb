use axum::http::HeaderValue;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod realtime;
pub mod services;
pub mod state;
pub mod storage;
pub mod text;

use middleware::auth::jwt_auth_middleware;
use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws", get(handlers::ws::upgrade))
        .merge(auth_public_routes())
        .merge(blog_public_routes())
        .merge(protected_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<Value>, error::ApiError> {
    database::health_check(&state.pool)
        .await
        .map_err(|_| error::ApiError::service_unavailable("Database unavailable"))?;
    Ok(Json(json!({ "status": "ok" })))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/forgot", post(auth::forgot_password))
        .route("/api/auth/reset", post(auth::reset_password))
        .route("/api/auth/logout", post(auth::logout))
}

fn blog_public_routes() -> Router<AppState> {
    use handlers::public::{blog, comments, help, media, rss};

    Router::new()
        .route("/api/public/tenants/:tenant_slug", get(blog::get_tenant))
        .route(
            "/api/public/tenants/:tenant_slug/posts",
            get(blog::list_posts),
        )
        .route(
            "/api/public/tenants/:tenant_slug/posts/:slug",
            get(blog::get_post),
        )
        .route(
            "/api/public/tenants/:tenant_slug/posts/:slug/related",
            get(blog::related_posts),
        )
        .route(
            "/api/public/tenants/:tenant_slug/posts/:slug/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/public/tenants/:tenant_slug/tags",
            get(blog::popular_tags),
        )
        .route(
            "/api/public/tenants/:tenant_slug/rss.xml",
            get(rss::feed),
        )
        .route("/api/public/help/seo", get(help::seo_help))
        .route("/api/public/help/articles/:slug", get(help::article))
        .route(
            "/api/media/:tenant_id/:filename",
            get(media::serve_legacy_file),
        )
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{
        auth, comments, dashboard, media, notifications, posts, search, seo, tags, tenants,
    };

    Router::new()
        .route("/api/auth/me", get(auth::me))
        // Tenant provisioning
        .route("/api/tenants", post(tenants::create_tenant))
        .route("/api/tenants/check-slug/:slug", get(tenants::check_slug))
        // Posts
        .route(
            "/api/tenants/:tenant_id/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/tenants/:tenant_id/posts/check-slug/:slug",
            get(posts::check_slug),
        )
        .route(
            "/api/tenants/:tenant_id/posts/slug/:slug",
            get(posts::get_post_by_slug),
        )
        .route(
            "/api/tenants/:tenant_id/posts/:post_id",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/api/tenants/:tenant_id/posts/:post_id/comments",
            post(comments::create_comment),
        )
        // Comment moderation
        .route(
            "/api/tenants/:tenant_id/comments",
            get(comments::pending_comments),
        )
        .route(
            "/api/tenants/:tenant_id/comments/:comment_id/approve",
            put(comments::approve_comment),
        )
        .route(
            "/api/tenants/:tenant_id/comments/:comment_id/reject",
            put(comments::reject_comment),
        )
        .route(
            "/api/tenants/:tenant_id/comments/:comment_id",
            delete(comments::delete_comment),
        )
        // Media library
        .route(
            "/api/tenants/:tenant_id/media/upload",
            post(media::upload_media),
        )
        .route("/api/tenants/:tenant_id/media", get(media::list_media))
        .route(
            "/api/tenants/:tenant_id/media/:media_id",
            get(media::get_media)
                .put(media::rename_media)
                .delete(media::delete_media),
        )
        .route(
            "/api/tenants/:tenant_id/media-old/upload",
            post(media::upload_legacy),
        )
        .route(
            "/api/tenants/:tenant_id/media-old/:filename",
            delete(media::delete_legacy),
        )
        // Notifications
        .route(
            "/api/tenants/:tenant_id/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/recent",
            get(notifications::recent_notifications),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/unread",
            get(notifications::unread_notifications),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/unread/count",
            get(notifications::unread_count),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/read-all",
            put(notifications::mark_all_read),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/all",
            delete(notifications::delete_all_notifications),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/:notification_id/read",
            put(notifications::mark_read),
        )
        .route(
            "/api/tenants/:tenant_id/notifications/:notification_id",
            delete(notifications::delete_notification),
        )
        // SEO settings
        .route(
            "/api/tenants/:tenant_id/seo",
            get(seo::get_seo).put(seo::update_seo),
        )
        .route("/api/tenants/:tenant_id/seo/preview", post(seo::preview_seo))
        // Tags and search
        .route("/api/tenants/:tenant_id/tags", get(tags::list_tags))
        .route("/api/search", get(search::search))
        // Dashboard
        .route(
            "/api/tenants/:tenant_id/dashboard/stats",
            get(dashboard::stats),
        )
        .route(
            "/api/tenants/:tenant_id/dashboard/recent-activity",
            get(dashboard::recent_activity),
        )
        .layer(from_fn(jwt_auth_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::realtime::RealtimeHub;
    use crate::storage::{LocalDiskStorage, ObjectStore};

    // A lazy pool never connects until a handler actually queries, which is
    // enough to exercise routing.
    fn test_app() -> Router {
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        let store: Arc<dyn ObjectStore> = Arc::new(LocalDiskStorage::new(
            "/tmp/sprilliblo-test",
            "/api/media".to_string(),
        ));
        app(AppState::new(
            pool,
            Arc::new(RealtimeHub::new()),
            store.clone(),
            store,
        ))
    }

    async fn status_of(method: &str, path: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn rss_feed_lives_under_the_public_tenant_prefix() {
        // A 405 on the wrong method proves the path is registered without
        // touching the database.
        assert_eq!(
            status_of("POST", "/api/public/tenants/my-blog/rss.xml").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        // Not served from the root, where it would shadow top-level paths.
        assert_eq!(
            status_of("GET", "/my-blog/rss.xml").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn help_center_is_public() {
        assert_eq!(status_of("GET", "/api/public/help/seo").await, StatusCode::OK);
        assert_eq!(
            status_of("GET", "/api/public/help/articles/meta-title").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of("GET", "/api/public/help/articles/nope").await,
            StatusCode::NOT_FOUND
        );
    }
}
