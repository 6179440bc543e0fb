use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::auth_service::AuthResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub token: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth().login(&request.email, &request.password).await?;
    Ok(Json(response))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state
        .auth()
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await?;
    Ok(Json(response))
}

/// POST /api/auth/forgot
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotRequest>,
) -> Result<Json<Value>, ApiError> {
    state.auth().forgot_password(&request.email).await?;
    Ok(Json(json!({ "message": "Password reset email sent" })))
}

/// POST /api/auth/reset
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth()
        .reset_password(&request.token, &request.password)
        .await?;
    Ok(Json(json!({ "message": "Password reset successful" })))
}

/// POST /api/auth/logout - JWTs are stateless, the client just drops the
/// token.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}
