use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant is one branded blog: the unit of data isolation. Settings and the
/// member list live as JSONB documents on the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub settings: Json<BlogSettings>,
    pub members: Json<Vec<TenantMember>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn role_of(&self, user_id: Uuid) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogSettings {
    pub theme: String,
    pub allow_comments: bool,
    pub is_public: bool,
    pub custom_domain: Option<String>,
    pub seo: SeoSettings,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            allow_comments: true,
            is_public: true,
            custom_domain: None,
            seo: SeoSettings::default(),
        }
    }
}

/// Per-tenant metadata controlling search/social preview rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoSettings {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub twitter_card: String,
    pub indexable: bool,
    pub follow_links: bool,
    pub canonical_url: Option<String>,
    pub structured_data: Option<String>,
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self {
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            og_title: None,
            og_description: None,
            og_image: None,
            twitter_title: None,
            twitter_description: None,
            twitter_image: None,
            twitter_card: "summary_large_image".to_string(),
            indexable: true,
            follow_links: true,
            canonical_url: None,
            structured_data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMember {
    pub user_id: Uuid,
    /// OWNER, ADMIN, EDITOR or VIEWER
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl TenantMember {
    pub fn owner(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: "OWNER".to_string(),
            joined_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let settings = BlogSettings::default();
        assert_eq!(settings.theme, "default");
        assert!(settings.allow_comments);
        assert!(settings.is_public);
        assert_eq!(settings.seo.twitter_card, "summary_large_image");
    }

    #[test]
    fn settings_deserialize_from_partial_json() {
        let settings: BlogSettings =
            serde_json::from_str(r#"{"theme":"dark"}"#).expect("partial settings");
        assert_eq!(settings.theme, "dark");
        assert!(settings.allow_comments);
    }

    #[test]
    fn membership_lookup() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            slug: "my-blog".to_string(),
            name: "My Blog".to_string(),
            description: None,
            owner_id: owner,
            settings: Json(BlogSettings::default()),
            members: Json(vec![TenantMember::owner(owner)]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(tenant.is_member(owner));
        assert_eq!(tenant.role_of(owner), Some("OWNER"));
        assert!(!tenant.is_member(stranger));
        assert_eq!(tenant.role_of(stranger), None);
    }
}
