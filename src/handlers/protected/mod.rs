// Protected endpoints. Every handler receives the authenticated caller as
// an `Extension<AuthUser>` injected by the JWT middleware; tenant-scoped
// routes additionally verify that the tenant in the path matches the
// tenant baked into the token.
pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod media;
pub mod notifications;
pub mod posts;
pub mod search;
pub mod seo;
pub mod tags;
pub mod tenants;

use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// The tenant a caller operates on: the path tenant, provided it matches
/// the token's scope.
pub(crate) fn scoped_tenant(auth: &AuthUser, path_tenant_id: Uuid) -> Result<Uuid, ApiError> {
    let token_tenant = auth.require_tenant()?;
    if token_tenant != path_tenant_id {
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(path_tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(tenant_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            tenant_id,
        }
    }

    #[test]
    fn scoped_tenant_accepts_matching_path() {
        let tenant_id = Uuid::new_v4();
        let auth = auth_user(Some(tenant_id));
        assert_eq!(scoped_tenant(&auth, tenant_id).unwrap(), tenant_id);
    }

    #[test]
    fn scoped_tenant_rejects_foreign_and_unscoped_tokens() {
        let auth = auth_user(Some(Uuid::new_v4()));
        assert!(scoped_tenant(&auth, Uuid::new_v4()).is_err());

        let auth = auth_user(None);
        assert!(scoped_tenant(&auth, Uuid::new_v4()).is_err());
    }
}
