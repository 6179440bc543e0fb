use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::{BlogSettings, SeoSettings, Tenant, TenantMember};
use crate::database::repos::{TenantRepository, UserRepository};
use crate::services::auth_service::{map_user_dto, AuthResponse};
use crate::services::ServiceError;
use crate::text;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugCheck {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

pub struct TenantService {
    tenants: TenantRepository,
    users: UserRepository,
}

impl TenantService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tenants: TenantRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, ServiceError> {
        Ok(self.tenants.find_by_slug(slug).await?)
    }

    pub async fn is_slug_available(&self, slug: &str) -> Result<bool, ServiceError> {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() || text::is_reserved_slug(&slug) {
            return Ok(false);
        }
        Ok(!self.tenants.exists_by_slug(&slug).await?)
    }

    /// Availability plus numbered alternatives when the slug is taken.
    pub async fn check_slug(&self, slug: &str) -> Result<SlugCheck, ServiceError> {
        let available = self.is_slug_available(slug).await?;
        if available {
            return Ok(SlugCheck {
                available,
                suggestions: None,
            });
        }

        let base = slug.trim().to_lowercase();
        let mut suggestions = Vec::new();
        for i in 1..6 {
            let candidate = format!("{base}-{i}");
            if self.is_slug_available(&candidate).await? {
                suggestions.push(candidate);
                if suggestions.len() == 3 {
                    break;
                }
            }
        }

        Ok(SlugCheck {
            available,
            suggestions: Some(suggestions),
        })
    }

    /// Creates the blog, makes the caller its owner and reissues a token
    /// scoped to the new tenant.
    pub async fn create_tenant_for_user(
        &self,
        user_id: Uuid,
        blog_name: &str,
        blog_slug: &str,
    ) -> Result<AuthResponse, ServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let blog_name = blog_name.trim();
        if blog_name.is_empty() {
            return Err(ServiceError::validation("Blog name is required"));
        }
        if !text::is_valid_slug_format(blog_slug) {
            return Err(ServiceError::validation("Invalid blog slug format"));
        }
        if !self.is_slug_available(blog_slug).await? {
            return Err(ServiceError::conflict("Blog slug is already taken"));
        }

        let slug = blog_slug.trim().to_lowercase();
        let tenant = self
            .tenants
            .insert(
                &slug,
                blog_name,
                None,
                user_id,
                &BlogSettings::default(),
                &[TenantMember::owner(user_id)],
            )
            .await?;

        self.users.add_tenant(user_id, tenant.id).await?;

        let claims = Claims::new(user.email.clone(), user_id, Some(tenant.id));
        let token = generate_jwt(&claims)
            .map_err(|e| ServiceError::Internal(format!("token generation failed: {e}")))?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, "tenant created");

        let user_tenants = self.tenants.find_by_member(user_id).await?;
        Ok(AuthResponse {
            token,
            user: map_user_dto(&user, Some(tenant.id), &user_tenants),
        })
    }

    async fn member_tenant(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Tenant, ServiceError> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant not found"))?;
        if !tenant.is_member(user_id) {
            return Err(ServiceError::forbidden("Access denied"));
        }
        Ok(tenant)
    }

    pub async fn seo_settings(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<SeoSettings, ServiceError> {
        let tenant = self.member_tenant(tenant_id, user_id).await?;
        Ok(tenant.settings.seo.clone())
    }

    pub async fn update_seo_settings(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        seo: SeoSettings,
    ) -> Result<SeoSettings, ServiceError> {
        let tenant = self.member_tenant(tenant_id, user_id).await?;

        let mut settings = tenant.settings.0.clone();
        settings.seo = seo.clone();
        self.tenants.update_settings(tenant_id, &settings).await?;

        Ok(seo)
    }

    /// Renders how the blog would appear on Google, Facebook and Twitter,
    /// cascading through the metadata fallback chain.
    pub async fn seo_preview(
        &self,
        tenant_id: Uuid,
        seo: &SeoSettings,
    ) -> Result<Value, ServiceError> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant not found"))?;

        Ok(build_seo_preview(&tenant, seo))
    }
}

pub(crate) fn build_seo_preview(tenant: &Tenant, seo: &SeoSettings) -> Value {
    let base_domain = &config::config().site.base_domain;
    let url = format!("https://{}.{}", tenant.slug, base_domain);

    json!({
        "google": {
            "title": seo.meta_title.clone().unwrap_or_else(|| tenant.name.clone()),
            "description": seo.meta_description.clone().or_else(|| tenant.description.clone()),
            "url": url,
        },
        "facebook": {
            "title": seo.og_title.clone().or_else(|| seo.meta_title.clone()),
            "description": seo.og_description.clone().or_else(|| seo.meta_description.clone()),
            "image": seo.og_image.clone(),
            "url": url,
        },
        "twitter": {
            "title": seo.twitter_title.clone().or_else(|| seo.og_title.clone()),
            "description": seo.twitter_description.clone().or_else(|| seo.og_description.clone()),
            "image": seo.twitter_image.clone().or_else(|| seo.og_image.clone()),
            "card": seo.twitter_card.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn tenant() -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            slug: "my-blog".to_string(),
            name: "My Blog".to_string(),
            description: Some("A blog about things".to_string()),
            owner_id: Uuid::new_v4(),
            settings: Json(BlogSettings::default()),
            members: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn preview_falls_back_to_tenant_metadata() {
        let preview = build_seo_preview(&tenant(), &SeoSettings::default());

        assert_eq!(preview["google"]["title"], "My Blog");
        assert_eq!(preview["google"]["description"], "A blog about things");
        assert!(preview["google"]["url"]
            .as_str()
            .unwrap()
            .starts_with("https://my-blog."));
        assert_eq!(preview["twitter"]["card"], "summary_large_image");
    }

    #[test]
    fn preview_cascades_twitter_from_og_from_meta() {
        let seo = SeoSettings {
            meta_title: Some("Meta title".to_string()),
            og_description: Some("OG description".to_string()),
            og_image: Some("https://img.example/og.png".to_string()),
            ..SeoSettings::default()
        };
        let preview = build_seo_preview(&tenant(), &seo);

        // Facebook falls back to meta, Twitter falls back to OG.
        assert_eq!(preview["facebook"]["title"], "Meta title");
        assert_eq!(preview["twitter"]["description"], "OG description");
        assert_eq!(preview["twitter"]["image"], "https://img.example/og.png");
        assert_eq!(preview["twitter"]["title"], Value::Null);
    }
}
