// Business logic layer. Handlers stay thin; everything tenant-aware
// lives here.
pub mod auth_service;
pub mod comment_service;
pub mod media_service;
pub mod notification_service;
pub mod post_service;
pub mod search_service;
pub mod tenant_service;

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

pub use auth_service::AuthService;
pub use comment_service::CommentService;
pub use media_service::MediaService;
pub use notification_service::NotificationService;
pub use post_service::PostService;
pub use search_service::SearchService;
pub use tenant_service::TenantService;

/// Errors surfaced by the service layer; the HTTP layer maps each variant
/// to a status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Spam detected")]
    Spam,

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ServiceError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }
}

/// One page of results plus the bookkeeping clients need for pagers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

/// Clamp raw pagination query params to sane bounds.
pub fn clamp_paging(page: Option<i64>, size: Option<i64>, max_size: i64) -> (i64, i64) {
    let page = page.unwrap_or(0).max(0);
    let size = size.unwrap_or(10).clamp(1, max_size);
    (page, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math() {
        let page = Page::new(vec![1, 2, 3], 0, 10, 23);
        assert_eq!(page.total_pages, 3);

        let exact = Page::<i32>::new(vec![], 1, 10, 20);
        assert_eq!(exact.total_pages, 2);

        let empty = Page::<i32>::new(vec![], 0, 10, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn paging_clamps() {
        assert_eq!(clamp_paging(None, None, 50), (0, 10));
        assert_eq!(clamp_paging(Some(-3), Some(500), 50), (0, 50));
        assert_eq!(clamp_paging(Some(2), Some(0), 50), (2, 1));
    }
}
