use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{Post, PostStatus};

/// Filters for the tenant-facing post listing.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub tag: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive substring match on the author display name.
    pub author: Option<String>,
}

/// Sort order for the public published listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedSort {
    PublishedAt,
    Views,
}

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(&self, post: &Post) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (tenant_id, author_id, title, slug, excerpt, body_html,
                               body_markdown, author_name, tags, categories,
                               cover_image_url, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(post.tenant_id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.body_html)
        .bind(&post.body_markdown)
        .bind(&post.author_name)
        .bind(&post.tags)
        .bind(&post.categories)
        .bind(&post.cover_image_url)
        .bind(post.status)
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, post: &Post) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $3, slug = $4, excerpt = $5, body_html = $6, body_markdown = $7,
                author_name = $8, tags = $9, categories = $10, cover_image_url = $11,
                status = $12, published_at = $13, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(post.tenant_id)
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.body_html)
        .bind(&post.body_markdown)
        .bind(&post.author_name)
        .bind(&post.tags)
        .bind(&post.categories)
        .bind(&post.cover_image_url)
        .bind(post.status)
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_in_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE tenant_id = $1 AND slug = $2")
            .bind(tenant_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_published_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE tenant_id = $1 AND slug = $2 AND status = $3",
        )
        .bind(tenant_id)
        .bind(slug)
        .bind(PostStatus::Published)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists_slug(&self, tenant_id: Uuid, slug: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE tenant_id = $1 AND slug = $2)",
        )
        .bind(tenant_id)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Post id currently holding a slug, if any. Used so an update can keep
    /// the slug it already owns.
    pub async fn slug_owner(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM posts WHERE tenant_id = $1 AND slug = $2")
                .bind(tenant_id)
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Every slug in the tenant equal to the base or starting with `base-`,
    /// so slug conflicts can be resolved in memory.
    pub async fn slugs_with_base(
        &self,
        tenant_id: Uuid,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT slug FROM posts
            WHERE tenant_id = $1 AND (slug = $2 OR slug LIKE $2 || '-%')
            "#,
        )
        .bind(tenant_id)
        .bind(base)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Atomic view bump; a single UPDATE so concurrent fetches never lose
    /// an increment.
    pub async fn increment_views(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET views = views + 1
            WHERE tenant_id = $1 AND slug = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    /// Tenant-facing listing with optional filters, newest updates first.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PostFilter,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Post>, i64), sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM posts");
        Self::push_filter(&mut query, tenant_id, filter);
        query
            .push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(size)
            .push(" OFFSET ")
            .push_bind(page * size);
        let posts = query.build_query_as::<Post>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        Self::push_filter(&mut count, tenant_id, filter);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        Ok((posts, total))
    }

    fn push_filter(query: &mut QueryBuilder<'_, Postgres>, tenant_id: Uuid, filter: &PostFilter) {
        query.push(" WHERE tenant_id = ").push_bind(tenant_id);
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(tag) = filter.tag.clone().filter(|t| !t.trim().is_empty()) {
            query
                .push(" AND tags @> ARRAY[")
                .push_bind(tag.trim().to_string())
                .push("]");
        }
        if let Some(category) = filter.category.clone().filter(|c| !c.trim().is_empty()) {
            query
                .push(" AND categories @> ARRAY[")
                .push_bind(category.trim().to_string())
                .push("]");
        }
        if let Some(author) = filter.author.clone().filter(|a| !a.trim().is_empty()) {
            query
                .push(" AND author_name ILIKE '%' || ")
                .push_bind(author.trim().to_string())
                .push(" || '%'");
        }
    }

    /// Public published listing with tag/author/title-substring filters.
    pub async fn list_published(
        &self,
        tenant_id: Uuid,
        tag: Option<&str>,
        author: Option<&str>,
        title_query: Option<&str>,
        sort: PublishedSort,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Post>, i64), sqlx::Error> {
        let push_published = |query: &mut QueryBuilder<'_, Postgres>| {
            query
                .push(" WHERE tenant_id = ")
                .push_bind(tenant_id)
                .push(" AND status = ")
                .push_bind(PostStatus::Published);
            if let Some(q) = title_query.map(str::trim).filter(|q| !q.is_empty()) {
                query
                    .push(" AND title ILIKE '%' || ")
                    .push_bind(q.to_string())
                    .push(" || '%'");
            } else if let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) {
                query
                    .push(" AND tags @> ARRAY[")
                    .push_bind(tag.to_string())
                    .push("]");
            } else if let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
                query
                    .push(" AND author_name ILIKE '%' || ")
                    .push_bind(author.to_string())
                    .push(" || '%'");
            }
        };

        let order = match sort {
            PublishedSort::PublishedAt => " ORDER BY published_at DESC NULLS LAST",
            PublishedSort::Views => " ORDER BY views DESC",
        };

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM posts");
        push_published(&mut query);
        query
            .push(order)
            .push(" LIMIT ")
            .push_bind(size)
            .push(" OFFSET ")
            .push_bind(page * size);
        let posts = query.build_query_as::<Post>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_published(&mut count);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        Ok((posts, total))
    }

    /// Published posts sharing at least one tag, excluding the current slug.
    pub async fn related_by_tags(
        &self,
        tenant_id: Uuid,
        tags: &[String],
        exclude_slug: &str,
        limit: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1 AND status = $2 AND slug <> $3 AND tags && $4
            ORDER BY published_at DESC NULLS LAST
            LIMIT $5
            "#,
        )
        .bind(tenant_id)
        .bind(PostStatus::Published)
        .bind(exclude_slug)
        .bind(tags)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Fallback for tagless posts: most recent published, excluding self.
    pub async fn recent_published_excluding(
        &self,
        tenant_id: Uuid,
        exclude_slug: &str,
        limit: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1 AND status = $2 AND slug <> $3
            ORDER BY published_at DESC NULLS LAST
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(PostStatus::Published)
        .bind(exclude_slug)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn recent_published(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1 AND status = $2
            ORDER BY published_at DESC NULLS LAST
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(PostStatus::Published)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Full published set of a tenant; feeds tag counting and search scans.
    pub async fn published_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE tenant_id = $1 AND status = $2")
            .bind(tenant_id)
            .bind(PostStatus::Published)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn all_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Case-insensitive title substring search over published posts.
    pub async fn search_published_titles(
        &self,
        tenant_id: Uuid,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE tenant_id = $1 AND status = $2 AND title ILIKE '%' || $3 || '%'
            ORDER BY published_at DESC NULLS LAST
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(PostStatus::Published)
        .bind(term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
