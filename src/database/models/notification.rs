use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    CommentReply,
    CommentApproved,
    CommentRejected,
    PostPublished,
    UserInvited,
    SystemAnnouncement,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub payload: Json<serde_json::Value>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    /// Set only on the unread -> read transition.
    pub read_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::PostPublished).unwrap(),
            "\"POST_PUBLISHED\""
        );
        let kind: NotificationKind = serde_json::from_str("\"COMMENT_REPLY\"").unwrap();
        assert_eq!(kind, NotificationKind::CommentReply);
    }
}
