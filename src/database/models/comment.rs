use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    /// Set for logged-in submitters, who skip moderation.
    pub author_id: Option<Uuid>,
    pub body: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for (status, json) in [
            (CommentStatus::Pending, "\"PENDING\""),
            (CommentStatus::Approved, "\"APPROVED\""),
            (CommentStatus::Rejected, "\"REJECTED\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), json);
            let parsed: CommentStatus = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
