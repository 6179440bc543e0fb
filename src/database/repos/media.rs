use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Media;

#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, media: &Media) -> Result<Media, sqlx::Error> {
        sqlx::query_as::<_, Media>(
            r#"
            INSERT INTO media (tenant_id, uploaded_by, url, thumbnail_url, filename,
                               original_filename, mime_type, size, width, height, storage_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(media.tenant_id)
        .bind(media.uploaded_by)
        .bind(&media.url)
        .bind(&media.thumbnail_url)
        .bind(&media.filename)
        .bind(&media.original_filename)
        .bind(&media.mime_type)
        .bind(media.size)
        .bind(media.width)
        .bind(media.height)
        .bind(&media.storage_key)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_in_tenant(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Media>, sqlx::Error> {
        sqlx::query_as::<_, Media>("SELECT * FROM media WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Library listing, newest uploads first, optionally narrowed by a
    /// MIME prefix such as `image/`.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        mime_prefix: Option<&str>,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Media>, i64), sqlx::Error> {
        let items = match mime_prefix {
            Some(prefix) => {
                sqlx::query_as::<_, Media>(
                    r#"
                    SELECT * FROM media
                    WHERE tenant_id = $1 AND mime_type LIKE $2 || '%'
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(tenant_id)
                .bind(prefix)
                .bind(size)
                .bind(page * size)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Media>(
                    r#"
                    SELECT * FROM media
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

        let total = match mime_prefix {
            Some(prefix) => {
                let (n,): (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM media WHERE tenant_id = $1 AND mime_type LIKE $2 || '%'",
                )
                .bind(tenant_id)
                .bind(prefix)
                .fetch_one(&self.pool)
                .await?;
                n
            }
            None => {
                let (n,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM media WHERE tenant_id = $1")
                        .bind(tenant_id)
                        .fetch_one(&self.pool)
                        .await?;
                n
            }
        };

        Ok((items, total))
    }

    pub async fn update_filename(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filename: &str,
    ) -> Result<Option<Media>, sqlx::Error> {
        sqlx::query_as::<_, Media>(
            r#"
            UPDATE media
            SET filename = $3, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
