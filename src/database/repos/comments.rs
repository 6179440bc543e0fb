use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Comment, CommentStatus};

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, comment: &Comment) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (tenant_id, post_id, author_name, author_email,
                                  author_id, body, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(comment.tenant_id)
        .bind(comment.post_id)
        .bind(&comment.author_name)
        .bind(&comment.author_email)
        .bind(comment.author_id)
        .bind(&comment.body)
        .bind(comment.status)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_in_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Approved comments for a post, oldest first, as shown publicly.
    pub async fn approved_for_post(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE tenant_id = $1 AND post_id = $2 AND status = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(post_id)
        .bind(CommentStatus::Approved)
        .fetch_all(&self.pool)
        .await
    }

    /// Moderation listing: newest first, optionally narrowed to one status.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<CommentStatus>,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Comment>, i64), sqlx::Error> {
        let comments = match status {
            Some(status) => {
                sqlx::query_as::<_, Comment>(
                    r#"
                    SELECT * FROM comments
                    WHERE tenant_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(tenant_id)
                .bind(status)
                .bind(size)
                .bind(page * size)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Comment>(
                    r#"
                    SELECT * FROM comments
                    WHERE tenant_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(tenant_id)
                .bind(size)
                .bind(page * size)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let total = match status {
            Some(status) => {
                let (n,): (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM comments WHERE tenant_id = $1 AND status = $2",
                )
                .bind(tenant_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
                n
            }
            None => {
                let (n,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM comments WHERE tenant_id = $1")
                        .bind(tenant_id)
                        .fetch_one(&self.pool)
                        .await?;
                n
            }
        };

        Ok((comments, total))
    }

    pub async fn count_all(&self, tenant_id: Uuid) -> Result<i64, sqlx::Error> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_by_status(
        &self,
        tenant_id: Uuid,
        status: CommentStatus,
    ) -> Result<i64, sqlx::Error> {
        let (n,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE tenant_id = $1 AND status = $2")
                .bind(tenant_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(n)
    }

    pub async fn set_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET status = $3, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
