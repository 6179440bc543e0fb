use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub tenant_ids: Vec<Uuid>,
    pub current_tenant_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Reset tokens are single-use and expire one hour after issue.
    pub fn reset_token_valid(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, self.reset_token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "writer@example.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email_verified: false,
            tenant_ids: vec![],
            current_tenant_id: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn full_name_joins_parts() {
        assert_eq!(user().full_name(), "Ada Lovelace");
    }

    #[test]
    fn reset_token_expiry() {
        let now = Utc::now();
        let mut u = user();
        assert!(!u.reset_token_valid(now));

        u.reset_token = Some("token".to_string());
        u.reset_token_expires_at = Some(now + Duration::hours(1));
        assert!(u.reset_token_valid(now));
        assert!(!u.reset_token_valid(now + Duration::hours(2)));
    }

    #[test]
    fn password_hash_never_serialized() {
        let json = serde_json::to_value(user()).expect("json");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("resetToken").is_none());
    }
}
