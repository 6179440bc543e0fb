use std::sync::Arc;

use sqlx::PgPool;

use crate::realtime::RealtimeHub;
use crate::services::{
    AuthService, CommentService, MediaService, NotificationService, PostService, SearchService,
    TenantService,
};
use crate::storage::ObjectStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub hub: Arc<RealtimeHub>,
    /// Object storage for the media library.
    pub library_store: Arc<dyn ObjectStore>,
    /// Local-disk storage behind the legacy single-image upload endpoint.
    pub legacy_store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        hub: Arc<RealtimeHub>,
        library_store: Arc<dyn ObjectStore>,
        legacy_store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            pool,
            hub,
            library_store,
            legacy_store,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.pool.clone())
    }

    pub fn tenants(&self) -> TenantService {
        TenantService::new(self.pool.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.pool.clone(), self.hub.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.pool.clone(), self.hub.clone())
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(self.pool.clone(), self.library_store.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.pool.clone(), self.hub.clone())
    }

    pub fn search(&self) -> SearchService {
        SearchService::new(self.pool.clone())
    }
}
