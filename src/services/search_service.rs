use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Post;
use crate::database::repos::PostRepository;
use crate::services::ServiceError;

/// Per-category caps keep a single query from scanning unbounded result
/// sets.
const MAX_CATEGORY_RESULTS: i64 = 20;
const MAX_TERM_LEN: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub posts: Vec<PostHit>,
    pub tags: Vec<TagHit>,
    pub authors: Vec<AuthorHit>,
    pub has_more: bool,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self {
            posts: vec![],
            tags: vec![],
            authors: vec![],
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHit {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHit {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHit {
    pub id: Uuid,
    pub name: String,
    pub count: i64,
}

pub struct SearchService {
    posts: PostRepository,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            posts: PostRepository::new(pool),
        }
    }

    /// Unified search over post titles, tags and author names within one
    /// tenant. Only published content is visible.
    pub async fn search(
        &self,
        tenant_id: Uuid,
        query: &str,
        limit: usize,
    ) -> Result<SearchResults, ServiceError> {
        let term = query.trim();
        if term.is_empty() {
            return Ok(SearchResults::empty());
        }
        let term: String = term.chars().take(MAX_TERM_LEN).collect();
        let cap = (limit as i64).min(MAX_CATEGORY_RESULTS).max(1);

        let title_matches = self
            .posts
            .search_published_titles(tenant_id, &term, cap)
            .await?;
        let post_hits: Vec<PostHit> = title_matches.iter().map(post_hit).collect();

        // Tags and authors come from a scan of the tenant's published set.
        let published = self.posts.published_by_tenant(tenant_id).await?;
        let needle = term.to_lowercase();
        let tags = tag_hits(&published, &needle, cap);
        let authors = author_hits(&published, &needle, cap);

        let has_more = post_hits.len() >= limit
            || tags.len() >= limit
            || authors.len() >= limit;

        Ok(SearchResults {
            posts: post_hits,
            tags,
            authors,
            has_more,
        })
    }
}

fn post_hit(post: &Post) -> PostHit {
    PostHit {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        excerpt: post.excerpt.clone().unwrap_or_default(),
        author: post.author_name.clone(),
        tags: post.tags.clone(),
    }
}

/// Case-insensitive substring match over tags, one hit per distinct tag.
/// `needle` must already be lowercased.
fn tag_hits(published: &[Post], needle: &str, cap: i64) -> Vec<TagHit> {
    let mut tags: Vec<TagHit> = Vec::new();
    for post in published {
        for tag in &post.tags {
            if tag.to_lowercase().contains(needle) && !tags.iter().any(|t| t.name == *tag) {
                tags.push(TagHit {
                    name: tag.clone(),
                    count: 1,
                });
                if tags.len() as i64 >= cap {
                    return tags;
                }
            }
        }
    }
    tags
}

/// Authors matched by display name, one hit per distinct author id.
fn author_hits(published: &[Post], needle: &str, cap: i64) -> Vec<AuthorHit> {
    let mut authors: Vec<AuthorHit> = Vec::new();
    for post in published {
        if post.author_name.to_lowercase().contains(needle)
            && !authors.iter().any(|a| a.id == post.author_id)
        {
            authors.push(AuthorHit {
                id: post.author_id,
                name: post.author_name.clone(),
                count: 1,
            });
            if authors.len() as i64 >= cap {
                return authors;
            }
        }
    }
    authors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PostStatus;
    use chrono::Utc;

    fn post(author_id: Uuid, author: &str, tags: &[&str]) -> Post {
        Post {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            author_id,
            title: "t".to_string(),
            slug: "t".to_string(),
            excerpt: None,
            body_html: None,
            body_markdown: None,
            author_name: author.to_string(),
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
    fn tag_hits_match_substrings_without_duplicates() {
        let author = Uuid::new_v4();
        let posts = vec![
            post(author, "A", &["Rustacean", "web"]),
            post(author, "A", &["Rustacean", "rust-tips"]),
        ];

        let hits = tag_hits(&posts, "rust", 20);
        let names: Vec<&str> = hits.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Rustacean", "rust-tips"]);
        assert!(hits.iter().all(|t| t.count == 1));
    }

    #[test]
    fn tag_hits_stop_at_the_cap() {
        let posts = vec![post(Uuid::new_v4(), "A", &["go-a", "go-b", "go-c"])];
        assert_eq!(tag_hits(&posts, "go", 2).len(), 2);
    }

    #[test]
    fn author_hits_dedupe_by_author_id() {
        let jane = Uuid::new_v4();
        let posts = vec![
            post(jane, "Jane Doe", &[]),
            post(jane, "Jane Doe", &[]),
            post(Uuid::new_v4(), "John Roe", &[]),
        ];

        let hits = author_hits(&posts, "doe", 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, jane);
        assert_eq!(hits[0].name, "Jane Doe");
    }

    #[test]
    fn author_match_is_case_insensitive() {
        let posts = vec![post(Uuid::new_v4(), "JANE", &[])];
        assert_eq!(author_hits(&posts, "jane", 20).len(), 1);
        assert!(author_hits(&posts, "john", 20).is_empty());
    }
}
