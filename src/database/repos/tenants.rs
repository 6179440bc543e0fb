use serde_json::json;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{BlogSettings, Tenant, TenantMember};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn exists_by_slug(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tenants WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// All tenants the user is a member of, via JSONB containment on the
    /// members document.
    pub async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE members @> $1 ORDER BY created_at",
        )
        .bind(Json(json!([{ "userId": user_id }])))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert(
        &self,
        slug: &str,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
        settings: &BlogSettings,
        members: &[TenantMember],
    ) -> Result<Tenant, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (slug, name, description, owner_id, settings, members)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .bind(Json(settings))
        .bind(Json(members))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_settings(
        &self,
        id: Uuid,
        settings: &BlogSettings,
    ) -> Result<Tenant, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET settings = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Json(settings))
        .fetch_one(&self.pool)
        .await
    }
}
