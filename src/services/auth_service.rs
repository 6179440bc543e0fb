use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::{Tenant, User};
use crate::database::repos::{TenantRepository, UserRepository};
use crate::services::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub tenants: Vec<TenantDto>,
    pub current_tenant: Option<TenantDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub role: String,
}

pub struct AuthService {
    users: UserRepository,
    tenants: TenantRepository,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tenants: TenantRepository::new(pool),
        }
    }

    /// Login failures never reveal whether the email exists.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::validation("Invalid email or password"))?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(format!("password verify failed: {e}")))?;
        if !matches {
            return Err(ServiceError::validation("Invalid email or password"));
        }

        let user_tenants = self.tenants.find_by_member(user.id).await?;

        // Default the tenant scope to the first membership when unset.
        let current_tenant_id = match user.current_tenant_id {
            Some(id) => Some(id),
            None => match user_tenants.first() {
                Some(tenant) => {
                    self.users.set_current_tenant(user.id, tenant.id).await?;
                    Some(tenant.id)
                }
                None => None,
            },
        };

        let claims = Claims::new(user.email.clone(), user.id, current_tenant_id);
        let token = generate_jwt(&claims)
            .map_err(|e| ServiceError::Internal(format!("token generation failed: {e}")))?;

        info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse {
            token,
            user: map_user_dto(&user, current_tenant_id, &user_tenants),
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthResponse, ServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::validation("Email and password are required"));
        }
        if self.users.exists_by_email(email).await? {
            return Err(ServiceError::validation("Email already exists"));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(format!("password hash failed: {e}")))?;

        let user = self
            .users
            .insert(email, &password_hash, first_name, last_name)
            .await?;

        let claims = Claims::new(user.email.clone(), user.id, None);
        let token = generate_jwt(&claims)
            .map_err(|e| ServiceError::Internal(format!("token generation failed: {e}")))?;

        info!(user_id = %user.id, "user registered");
        Ok(AuthResponse {
            token,
            user: map_user_dto(&user, None, &[]),
        })
    }

    /// Issues a one-hour reset token. Delivery is out of band; the caller
    /// only learns that the request was accepted.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ServiceError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::hours(1);
        self.users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        info!(user_id = %user.id, "password reset token issued");
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| ServiceError::validation("Invalid or expired reset token"))?;

        if !user.reset_token_valid(Utc::now()) {
            return Err(ServiceError::validation("Reset token has expired"));
        }

        let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(format!("password hash failed: {e}")))?;
        self.users.update_password(user.id, &password_hash).await?;

        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<UserDto, ServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let user_tenants = self.tenants.find_by_member(user_id).await?;
        Ok(map_user_dto(&user, user.current_tenant_id, &user_tenants))
    }
}

pub(crate) fn map_user_dto(
    user: &User,
    current_tenant_id: Option<Uuid>,
    tenants: &[Tenant],
) -> UserDto {
    let tenant_dtos: Vec<TenantDto> = tenants
        .iter()
        .map(|tenant| TenantDto {
            id: tenant.id,
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
            role: tenant.role_of(user.id).unwrap_or("VIEWER").to_string(),
        })
        .collect();

    let current_tenant = tenant_dtos
        .iter()
        .find(|t| Some(t.id) == current_tenant_id)
        .or_else(|| tenant_dtos.first())
        .cloned();

    UserDto {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email_verified: user.email_verified,
        tenants: tenant_dtos,
        current_tenant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{BlogSettings, TenantMember};
    use sqlx::types::Json;

    fn user_with_tenant(tenant_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "writer@example.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email_verified: true,
            tenant_ids: tenant_id.into_iter().collect(),
            current_tenant_id: tenant_id,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tenant_owned_by(user_id: Uuid) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            slug: "my-blog".to_string(),
            name: "My Blog".to_string(),
            description: None,
            owner_id: user_id,
            settings: Json(BlogSettings::default()),
            members: Json(vec![TenantMember::owner(user_id)]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn dto_reports_member_role() {
        let user = user_with_tenant(None);
        let tenant = tenant_owned_by(user.id);
        let dto = map_user_dto(&user, Some(tenant.id), std::slice::from_ref(&tenant));

        assert_eq!(dto.tenants.len(), 1);
        assert_eq!(dto.tenants[0].role, "OWNER");
        assert_eq!(dto.current_tenant.as_ref().map(|t| t.id), Some(tenant.id));
    }

    #[test]
    fn dto_defaults_role_for_non_members() {
        let user = user_with_tenant(None);
        let tenant = tenant_owned_by(Uuid::new_v4());
        let dto = map_user_dto(&user, None, std::slice::from_ref(&tenant));

        assert_eq!(dto.tenants[0].role, "VIEWER");
        // With no explicit current tenant, fall back to the first membership.
        assert_eq!(dto.current_tenant.as_ref().map(|t| t.id), Some(tenant.id));
    }

    #[test]
    fn dto_without_tenants_has_no_current() {
        let user = user_with_tenant(None);
        let dto = map_user_dto(&user, None, &[]);
        assert!(dto.tenants.is_empty());
        assert!(dto.current_tenant.is_none());
    }
}
