use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    /// Unique within the tenant, not globally.
    pub slug: String,
    pub excerpt: Option<String>,
    pub body_html: Option<String>,
    pub body_markdown: Option<String>,
    /// Denormalized author display name for the public API.
    pub author_name: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&PostStatus::Published).unwrap(),
            "\"PUBLISHED\""
        );
        let status: PostStatus = serde_json::from_str("\"DRAFT\"").unwrap();
        assert_eq!(status, PostStatus::Draft);
    }
}
