use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Notification, NotificationKind};
use crate::database::repos::NotificationRepository;
use crate::realtime::{RealtimeEvent, RealtimeHub};
use crate::services::{Page, ServiceError};

pub struct NotificationService {
    repo: NotificationRepository,
    hub: Arc<RealtimeHub>,
}

impl NotificationService {
    pub fn new(pool: PgPool, hub: Arc<RealtimeHub>) -> Self {
        Self {
            repo: NotificationRepository::new(pool),
            hub,
        }
    }

    /// Persists the notification, then pushes it to the user's live queue.
    /// The push is best-effort; a dropped event never fails the write.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
        action_url: Option<&str>,
        payload: serde_json::Value,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .repo
            .insert(tenant_id, user_id, kind, title, message, action_url, &payload)
            .await?;

        match serde_json::to_value(&notification) {
            Ok(data) => self
                .hub
                .publish_to_user(user_id, &RealtimeEvent::new("notification", data)),
            Err(e) => {
                tracing::warn!(notification_id = %notification.id, error = %e,
                    "skipping realtime push, serialization failed");
            }
        }

        Ok(notification)
    }

    async fn create_from(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        content: NotificationContent,
    ) -> Result<Notification, ServiceError> {
        self.create(
            tenant_id,
            user_id,
            content.kind,
            content.title,
            &content.message,
            content.action_url.as_deref(),
            content.payload,
        )
        .await
    }

    pub async fn notify_comment_reply(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        post_title: &str,
        commenter_name: &str,
        post_slug: &str,
    ) -> Result<Notification, ServiceError> {
        self.create_from(
            tenant_id,
            user_id,
            comment_reply(post_title, commenter_name, post_slug),
        )
        .await
    }

    pub async fn notify_comment_approved(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        post_title: &str,
        post_slug: &str,
    ) -> Result<Notification, ServiceError> {
        self.create_from(tenant_id, user_id, comment_approved(post_title, post_slug))
            .await
    }

    pub async fn notify_comment_rejected(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        post_title: &str,
        post_slug: &str,
    ) -> Result<Notification, ServiceError> {
        self.create_from(tenant_id, user_id, comment_rejected(post_title, post_slug))
            .await
    }

    pub async fn notify_post_published(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        post_title: &str,
        post_slug: &str,
    ) -> Result<Notification, ServiceError> {
        self.create_from(tenant_id, user_id, post_published(post_title, post_slug))
            .await
    }

    pub async fn notify_user_invited(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        blog_name: &str,
        inviter_name: &str,
    ) -> Result<Notification, ServiceError> {
        self.create_from(tenant_id, user_id, user_invited(blog_name, inviter_name))
            .await
    }

    pub async fn notify_system(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        title: &str,
        message: &str,
        action_url: Option<&str>,
    ) -> Result<Notification, ServiceError> {
        self.create(
            tenant_id,
            user_id,
            NotificationKind::SystemAnnouncement,
            title,
            message,
            action_url,
            json!({ "system": true }),
        )
        .await
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Page<Notification>, ServiceError> {
        let (items, total) = self.repo.list(tenant_id, user_id, page, size).await?;
        Ok(Page::new(items, page, size, total))
    }

    pub async fn recent(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.repo.recent(tenant_id, user_id, 10).await?)
    }

    pub async fn unread(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.repo.unread(tenant_id, user_id).await?)
    }

    pub async fn unread_count(&self, tenant_id: Uuid, user_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.repo.count_unread(tenant_id, user_id).await?)
    }

    pub async fn mark_read(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Notification, ServiceError> {
        self.repo
            .mark_read(tenant_id, user_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification not found"))
    }

    pub async fn mark_all_read(&self, tenant_id: Uuid, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.repo.mark_all_read(tenant_id, user_id).await?)
    }

    pub async fn delete(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        if !self.repo.delete(tenant_id, user_id, id).await? {
            return Err(ServiceError::not_found("Notification not found"));
        }
        Ok(())
    }

    pub async fn delete_all(&self, tenant_id: Uuid, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self.repo.delete_all(tenant_id, user_id).await?)
    }
}

/// A rendered notification: what the user reads and where clicking it
/// takes them.
struct NotificationContent {
    kind: NotificationKind,
    title: &'static str,
    message: String,
    action_url: Option<String>,
    payload: serde_json::Value,
}

fn comment_reply(post_title: &str, commenter_name: &str, post_slug: &str) -> NotificationContent {
    NotificationContent {
        kind: NotificationKind::CommentReply,
        title: "New Comment",
        message: format!("{commenter_name} commented on \"{post_title}\""),
        action_url: Some(format!("/posts/{post_slug}#comments")),
        payload: json!({
            "postSlug": post_slug,
            "commenterName": commenter_name,
            "postTitle": post_title,
        }),
    }
}

fn comment_approved(post_title: &str, post_slug: &str) -> NotificationContent {
    NotificationContent {
        kind: NotificationKind::CommentApproved,
        title: "Comment Approved",
        message: format!("Your comment on \"{post_title}\" was approved"),
        action_url: Some(format!("/posts/{post_slug}#comments")),
        payload: json!({ "postSlug": post_slug, "postTitle": post_title }),
    }
}

fn comment_rejected(post_title: &str, post_slug: &str) -> NotificationContent {
    NotificationContent {
        kind: NotificationKind::CommentRejected,
        title: "Comment Rejected",
        message: format!("Your comment on \"{post_title}\" was not approved"),
        action_url: Some(format!("/posts/{post_slug}#comments")),
        payload: json!({ "postSlug": post_slug, "postTitle": post_title }),
    }
}

fn post_published(post_title: &str, post_slug: &str) -> NotificationContent {
    NotificationContent {
        kind: NotificationKind::PostPublished,
        title: "Post Published",
        message: format!("Your post \"{post_title}\" has been published"),
        action_url: Some(format!("/posts/{post_slug}")),
        payload: json!({ "postSlug": post_slug, "postTitle": post_title }),
    }
}

fn user_invited(blog_name: &str, inviter_name: &str) -> NotificationContent {
    NotificationContent {
        kind: NotificationKind::UserInvited,
        title: "Invitation",
        message: format!("{inviter_name} invited you to join \"{blog_name}\""),
        action_url: Some("/dashboard".to_string()),
        payload: json!({ "blogName": blog_name, "inviterName": inviter_name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_reply_names_the_commenter() {
        let content = comment_reply("Hello World", "Alice", "hello-world");
        assert!(matches!(content.kind, NotificationKind::CommentReply));
        assert_eq!(content.title, "New Comment");
        assert_eq!(content.message, "Alice commented on \"Hello World\"");
        assert_eq!(
            content.action_url.as_deref(),
            Some("/posts/hello-world#comments")
        );
        assert_eq!(content.payload["commenterName"], "Alice");
        assert_eq!(content.payload["postSlug"], "hello-world");
    }

    #[test]
    fn moderation_outcomes_link_back_to_the_thread() {
        let approved = comment_approved("My Post", "my-post");
        assert_eq!(approved.message, "Your comment on \"My Post\" was approved");

        let rejected = comment_rejected("My Post", "my-post");
        assert_eq!(
            rejected.message,
            "Your comment on \"My Post\" was not approved"
        );

        for content in [approved, rejected] {
            assert_eq!(content.action_url.as_deref(), Some("/posts/my-post#comments"));
            assert_eq!(content.payload["postTitle"], "My Post");
        }
    }

    #[test]
    fn publish_notification_links_to_the_post() {
        let content = post_published("My Post", "my-post");
        assert_eq!(content.message, "Your post \"My Post\" has been published");
        assert_eq!(content.action_url.as_deref(), Some("/posts/my-post"));
    }

    #[test]
    fn invitation_points_at_the_dashboard() {
        let content = user_invited("Team Blog", "Bob");
        assert_eq!(content.message, "Bob invited you to join \"Team Blog\"");
        assert_eq!(content.action_url.as_deref(), Some("/dashboard"));
        assert_eq!(content.payload["blogName"], "Team Blog");
    }
}
