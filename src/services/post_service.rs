use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Post, PostStatus};
use crate::database::repos::{PostFilter, PostRepository, PublishedSort, UserRepository};
use crate::realtime::{RealtimeEvent, RealtimeHub};
use crate::services::{NotificationService, Page, ServiceError};
use crate::text;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body_html: Option<String>,
    pub body_markdown: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
}

pub struct PostService {
    posts: PostRepository,
    users: UserRepository,
    notifications: NotificationService,
    hub: Arc<RealtimeHub>,
}

impl PostService {
    pub fn new(pool: PgPool, hub: Arc<RealtimeHub>) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            notifications: NotificationService::new(pool, hub.clone()),
            hub,
        }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        author_id: Uuid,
        input: PostInput,
    ) -> Result<Post, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Author not found"))?;

        let slug = self
            .unique_slug(
                tenant_id,
                input.slug.as_deref().unwrap_or(&input.title),
                None,
            )
            .await?;

        let published = input.status == PostStatus::Published;
        let post = Post {
            id: Uuid::nil(), // assigned by the database
            tenant_id,
            author_id,
            title: input.title.clone(),
            slug,
            excerpt: input.excerpt,
            body_html: input.body_html.as_deref().map(text::sanitize_html),
            body_markdown: input.body_markdown,
            author_name: author.full_name(),
            tags: input.tags,
            categories: input.categories,
            cover_image_url: input.cover_image_url,
            status: input.status,
            published_at: published.then(Utc::now),
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let post = self.posts.insert(&post).await?;
        info!(post_id = %post.id, slug = %post.slug, "post created");

        if published {
            self.announce_publication(&post).await;
        }

        Ok(post)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        user_id: Uuid,
        input: PostInput,
    ) -> Result<Post, ServiceError> {
        let mut post = self
            .posts
            .find_in_tenant(tenant_id, post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))?;

        if post.author_id != user_id {
            return Err(ServiceError::forbidden("You can only edit your own posts"));
        }

        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Author not found"))?;

        if let Some(requested) = input.slug.as_deref() {
            if requested != post.slug {
                post.slug = self
                    .unique_slug(tenant_id, requested, Some(post.id))
                    .await?;
            }
        }

        post.title = input.title;
        post.excerpt = input.excerpt;
        post.body_html = input.body_html.as_deref().map(text::sanitize_html);
        post.body_markdown = input.body_markdown;
        post.author_name = author.full_name();
        post.tags = input.tags;
        post.categories = input.categories;
        post.cover_image_url = input.cover_image_url;

        let newly_published =
            input.status == PostStatus::Published && post.status == PostStatus::Draft;
        if newly_published {
            post.published_at = Some(Utc::now());
        }
        post.status = input.status;

        let post = self.posts.update(&post).await?;

        if newly_published {
            self.announce_publication(&post).await;
        }

        Ok(post)
    }

    pub async fn get(&self, tenant_id: Uuid, post_id: Uuid) -> Result<Post, ServiceError> {
        self.posts
            .find_in_tenant(tenant_id, post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))
    }

    /// Slug-based fetch used by editors and previews. Bumps the view counter
    /// atomically and pushes the new total to the dashboard channel.
    pub async fn get_by_slug(&self, tenant_id: Uuid, slug: &str) -> Result<Post, ServiceError> {
        let post = self
            .posts
            .increment_views(tenant_id, slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))?;

        self.hub.publish_to_tenant(
            tenant_id,
            "dashboard",
            &RealtimeEvent::new("viewUpdate", json!({ "postId": post.id, "views": post.views })),
        );

        Ok(post)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: PostFilter,
        page: i64,
        size: i64,
    ) -> Result<Page<Post>, ServiceError> {
        let (posts, total) = self.posts.list(tenant_id, &filter, page, size).await?;
        Ok(Page::new(posts, page, size, total))
    }

    pub async fn delete(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        let post = self
            .posts
            .find_in_tenant(tenant_id, post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))?;

        if post.author_id != user_id {
            return Err(ServiceError::forbidden("You can only delete your own posts"));
        }

        self.posts.delete(tenant_id, post_id).await?;
        info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    /// Numbered alternatives for a taken post slug.
    pub async fn slug_suggestions(
        &self,
        tenant_id: Uuid,
        base: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let taken = self.posts.slugs_with_base(tenant_id, base).await?;
        Ok(text::slug_suggestions(base, |candidate| {
            !taken.iter().any(|slug| slug == candidate)
        }))
    }

    pub async fn slug_taken(&self, tenant_id: Uuid, slug: &str) -> Result<bool, ServiceError> {
        Ok(self.posts.exists_slug(tenant_id, slug).await?)
    }

    pub async fn published_page(
        &self,
        tenant_id: Uuid,
        tag: Option<&str>,
        author: Option<&str>,
        query: Option<&str>,
        sort: PublishedSort,
        page: i64,
        size: i64,
    ) -> Result<Page<Post>, ServiceError> {
        let (posts, total) = self
            .posts
            .list_published(tenant_id, tag, author, query, sort, page, size)
            .await?;
        Ok(Page::new(posts, page, size, total))
    }

    /// Public slug fetch: visible only when published, and every fetch
    /// counts a view.
    pub async fn public_post(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Post>, ServiceError> {
        if self
            .posts
            .find_published_by_slug(tenant_id, slug)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let post = self
            .posts
            .increment_views(tenant_id, slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))?;

        self.hub.publish_to_tenant(
            tenant_id,
            "dashboard",
            &RealtimeEvent::new("viewUpdate", json!({ "postId": post.id, "views": post.views })),
        );

        Ok(Some(post))
    }

    pub async fn find_published_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Post>, ServiceError> {
        Ok(self.posts.find_published_by_slug(tenant_id, slug).await?)
    }

    /// Published posts sharing a tag with the given one; falls back to the
    /// most recent posts when it has no tags.
    pub async fn related(
        &self,
        tenant_id: Uuid,
        slug: &str,
        limit: i64,
    ) -> Result<Vec<Post>, ServiceError> {
        let current = self.posts.find_by_slug(tenant_id, slug).await?;
        let posts = match current {
            Some(post) if !post.tags.is_empty() => {
                self.posts
                    .related_by_tags(tenant_id, &post.tags, slug, limit)
                    .await?
            }
            _ => {
                self.posts
                    .recent_published_excluding(tenant_id, slug, limit)
                    .await?
            }
        };
        Ok(posts)
    }

    /// Most used tags across published posts, normalized, optionally
    /// narrowed by a substring query.
    pub async fn popular_tags(
        &self,
        tenant_id: Uuid,
        query: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, ServiceError> {
        let posts = self.posts.published_by_tenant(tenant_id).await?;
        Ok(count_tags(&posts, query, limit))
    }

    pub async fn recent_published(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Post>, ServiceError> {
        Ok(self.posts.recent_published(tenant_id, limit).await?)
    }

    pub async fn all_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Post>, ServiceError> {
        Ok(self.posts.all_by_tenant(tenant_id).await?)
    }

    async fn unique_slug(
        &self,
        tenant_id: Uuid,
        requested: &str,
        own_post_id: Option<Uuid>,
    ) -> Result<String, ServiceError> {
        let base = text::slugify(requested);
        let mut taken = self.posts.slugs_with_base(tenant_id, &base).await?;

        // A post keeps any slug it already owns.
        if let Some(own_id) = own_post_id {
            if let Some(owner) = self.posts.slug_owner(tenant_id, &base).await? {
                if owner == own_id {
                    taken.retain(|slug| slug != &base);
                }
            }
        }

        Ok(text::unique_slug(&base, |candidate| {
            taken.iter().any(|slug| slug == candidate)
        }))
    }

    /// Publication side effects are best-effort: a failed notification never
    /// rolls back the post write.
    async fn announce_publication(&self, post: &Post) {
        if let Err(e) = self
            .notifications
            .notify_post_published(post.tenant_id, post.author_id, &post.title, &post.slug)
            .await
        {
            warn!(post_id = %post.id, error = %e, "failed to create publish notification");
        }

        self.hub.publish_to_tenant(
            post.tenant_id,
            "posts",
            &RealtimeEvent::new(
                "postPublished",
                json!({ "postId": post.id, "slug": post.slug, "title": post.title }),
            ),
        );
    }
}

fn count_tags(posts: &[Post], query: Option<&str>, limit: usize) -> Vec<String> {
    let query = query.map(str::to_lowercase);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for post in posts {
        for tag in &post.tags {
            let normalized = text::normalize_tag(tag);
            if let Some(q) = &query {
                if !normalized.contains(q.as_str()) {
                    continue;
                }
            }
            *counts.entry(normalized).or_default() += 1;
        }
    }

    let mut tags: Vec<(String, usize)> = counts.into_iter().collect();
    // Count desc, then name for a stable order between equal counts.
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags.into_iter().take(limit).map(|(tag, _)| tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_tags(tags: &[&str]) -> Post {
        Post {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "t".to_string(),
            slug: "t".to_string(),
            excerpt: None,
            body_html: None,
            body_markdown: None,
            author_name: "A".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            categories: vec![],
            cover_image_url: None,
            status: PostStatus::Published,
            published_at: Some(Utc::now()),
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn popular_tags_rank_by_frequency() {
        let posts = vec![
            post_with_tags(&["rust", "web"]),
            post_with_tags(&["Rust"]),
            post_with_tags(&["web", "rust"]),
        ];
        let tags = count_tags(&posts, None, 10);
        assert_eq!(tags[0], "rust");
        assert_eq!(tags[1], "web");
    }

    #[test]
    fn popular_tags_normalize_and_filter() {
        let posts = vec![post_with_tags(&["Web Dev", "rust"])];
        let tags = count_tags(&posts, Some("web"), 10);
        assert_eq!(tags, vec!["web-dev"]);
    }

    #[test]
    fn popular_tags_respect_limit() {
        let posts = vec![post_with_tags(&["a", "b", "c", "d"])];
        assert_eq!(count_tags(&posts, None, 2).len(), 2);
    }
}
