use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub tenant_id: Option<Uuid>,
}

impl AuthUser {
    /// Tenant scope of the caller; missing scope is an authorization error
    /// for tenant-bound operations.
    pub fn require_tenant(&self) -> Result<Uuid, ApiError> {
        self.tenant_id
            .ok_or_else(|| ApiError::unauthorized("No tenant selected"))
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.sub,
            tenant_id: claims.tenant_id,
        }
    }
}

/// JWT authentication middleware that validates tokens and injects the user
/// context into the request for every protected route.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let token = extract_bearer_token(&headers).map_err(unauthorized_response)?;

    let claims = validate_jwt(&token)
        .map_err(|e| unauthorized_response(e.to_string()))?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Best-effort identity for public routes: a valid bearer token yields a
/// user (so logged-in commenters skip moderation), anything else is anonymous.
pub fn optional_auth_user(headers: &HeaderMap) -> Option<AuthUser> {
    let token = extract_bearer_token(headers).ok()?;
    match validate_jwt(&token) {
        Ok(claims) => Some(AuthUser::from(claims)),
        Err(e) => {
            tracing::warn!("ignoring invalid bearer token on public route: {}", e);
            None
        }
    }
}

fn unauthorized_response(msg: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthorized(msg.into());
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        let headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer  "));
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn optional_auth_is_none_for_garbage_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer not-a-jwt"));
        assert!(optional_auth_user(&headers).is_none());
    }
}
