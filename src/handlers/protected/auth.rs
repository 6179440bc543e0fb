use axum::extract::State;
use axum::response::Json;
use axum::Extension;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::auth_service::UserDto;
use crate::state::AppState;

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.auth().current_user(auth.user_id).await?;
    Ok(Json(user))
}
