use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Comment, CommentStatus};
use crate::database::repos::{CommentRepository, PostRepository};
use crate::realtime::{RealtimeEvent, RealtimeHub};
use crate::services::{NotificationService, Page, ServiceError};
use crate::text;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
    /// Hidden form field; bots fill it in, humans never see it.
    pub honeypot: Option<String>,
}

pub struct CommentService {
    comments: CommentRepository,
    posts: PostRepository,
    notifications: NotificationService,
    hub: Arc<RealtimeHub>,
}

impl CommentService {
    pub fn new(pool: PgPool, hub: Arc<RealtimeHub>) -> Self {
        Self {
            comments: CommentRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            notifications: NotificationService::new(pool, hub.clone()),
            hub,
        }
    }

    /// Logged-in commenters are approved immediately; anonymous ones wait
    /// for moderation.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        input: CommentInput,
        author_id: Option<Uuid>,
    ) -> Result<Comment, ServiceError> {
        let body = validate_input(&input)?;
        let status = initial_status(author_id);

        let comment = Comment {
            id: Uuid::nil(),
            tenant_id,
            post_id,
            author_name: input.author_name.trim().to_string(),
            author_email: input.author_email.trim().to_lowercase(),
            author_id,
            body,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let comment = self.comments.insert(&comment).await?;
        info!(comment_id = %comment.id, status = ?comment.status, "comment created");

        self.announce_new_comment(&comment).await;

        Ok(comment)
    }

    /// Best-effort side effects: notify the post author, and surface pending
    /// comments on the moderation channel.
    async fn announce_new_comment(&self, comment: &Comment) {
        let post = match self
            .posts
            .find_in_tenant(comment.tenant_id, comment.post_id)
            .await
        {
            Ok(Some(post)) => post,
            Ok(None) => return,
            Err(e) => {
                warn!(comment_id = %comment.id, error = %e,
                    "failed to load post for comment notification");
                return;
            }
        };

        if let Err(e) = self
            .notifications
            .notify_comment_reply(
                comment.tenant_id,
                post.author_id,
                &post.title,
                &comment.author_name,
                &post.slug,
            )
            .await
        {
            warn!(comment_id = %comment.id, error = %e, "failed to create comment notification");
        }

        if comment.status == CommentStatus::Pending {
            self.hub.publish_to_tenant(
                comment.tenant_id,
                "comments",
                &RealtimeEvent::new(
                    "commentPending",
                    json!({ "commentId": comment.id, "postId": comment.post_id }),
                ),
            );
        }
    }

    pub async fn approved_for_post(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, ServiceError> {
        Ok(self.comments.approved_for_post(tenant_id, post_id).await?)
    }

    pub async fn pending(
        &self,
        tenant_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<Comment>, ServiceError> {
        let (comments, total) = self
            .comments
            .list(tenant_id, Some(CommentStatus::Pending), page, size)
            .await?;
        Ok(Page::new(comments, page, size, total))
    }

    pub async fn approve(&self, tenant_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        self.moderate(tenant_id, comment_id, CommentStatus::Approved)
            .await
    }

    pub async fn reject(&self, tenant_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        self.moderate(tenant_id, comment_id, CommentStatus::Rejected)
            .await
    }

    async fn moderate(
        &self,
        tenant_id: Uuid,
        comment_id: Uuid,
        status: CommentStatus,
    ) -> Result<(), ServiceError> {
        let comment = self
            .comments
            .set_status(tenant_id, comment_id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment not found"))?;

        // Registered commenters hear back about the decision.
        if let Some(author_id) = comment.author_id {
            if let Ok(Some(post)) = self.posts.find_in_tenant(tenant_id, comment.post_id).await {
                let result = match status {
                    CommentStatus::Approved => {
                        self.notifications
                            .notify_comment_approved(tenant_id, author_id, &post.title, &post.slug)
                            .await
                    }
                    CommentStatus::Rejected => {
                        self.notifications
                            .notify_comment_rejected(tenant_id, author_id, &post.title, &post.slug)
                            .await
                    }
                    CommentStatus::Pending => return Ok(()),
                };
                if let Err(e) = result {
                    warn!(comment_id = %comment_id, error = %e,
                        "failed to create moderation notification");
                }
            }
        }

        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, comment_id: Uuid) -> Result<(), ServiceError> {
        if !self.comments.delete(tenant_id, comment_id).await? {
            return Err(ServiceError::not_found("Comment not found"));
        }
        Ok(())
    }

    pub async fn counts(&self, tenant_id: Uuid) -> Result<CommentCounts, ServiceError> {
        Ok(CommentCounts {
            total: self.comments.count_all(tenant_id).await?,
            pending: self
                .comments
                .count_by_status(tenant_id, CommentStatus::Pending)
                .await?,
            approved: self
                .comments
                .count_by_status(tenant_id, CommentStatus::Approved)
                .await?,
        })
    }

}

#[derive(Debug, Clone, Copy)]
pub struct CommentCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
}

fn validate_input(input: &CommentInput) -> Result<String, ServiceError> {
    if input.honeypot.as_deref().is_some_and(|h| !h.is_empty()) {
        return Err(ServiceError::Spam);
    }
    if input.author_name.trim().is_empty() || input.author_email.trim().is_empty() {
        return Err(ServiceError::validation("Name and email are required"));
    }
    let body = text::sanitize_comment(&input.body);
    if body.is_empty() {
        return Err(ServiceError::validation("Comment body is required"));
    }
    Ok(body)
}

fn initial_status(author_id: Option<Uuid>) -> CommentStatus {
    if author_id.is_some() {
        CommentStatus::Approved
    } else {
        CommentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(body: &str) -> CommentInput {
        CommentInput {
            author_name: "Reader".to_string(),
            author_email: "reader@example.com".to_string(),
            body: body.to_string(),
            honeypot: None,
        }
    }

    #[test]
    fn honeypot_rejects_as_spam() {
        let mut spam = input("Nice post");
        spam.honeypot = Some("http://spam.example".to_string());
        assert!(matches!(validate_input(&spam), Err(ServiceError::Spam)));

        // An empty honeypot field is what a real browser submits.
        let mut ok = input("Nice post");
        ok.honeypot = Some(String::new());
        assert!(validate_input(&ok).is_ok());
    }

    #[test]
    fn body_is_sanitized_and_required() {
        assert_eq!(
            validate_input(&input("<b>Nice</b>   post")).unwrap(),
            "Nice post"
        );
        assert!(validate_input(&input("<p></p>")).is_err());
    }

    #[test]
    fn anonymous_comments_await_moderation() {
        assert_eq!(initial_status(None), CommentStatus::Pending);
        assert_eq!(
            initial_status(Some(Uuid::new_v4())),
            CommentStatus::Approved
        );
    }
}
