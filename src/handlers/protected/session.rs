// handlers/protected/session.rs - token refresh and whoami

use axum::{extract::State, Extension};

use crate::auth::Identity;
use crate::database::models::User;
use crate::handlers::public::TokenResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /api/login/refresh - fresh token for the identity the current token carries
pub async fn refresh_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<TokenResponse> {
    let token = state.tokens.refresh(&Identity::from(&auth))?;
    Ok(ApiResponse::success(TokenResponse { token }))
}

/// GET /api/users/me
pub async fn whoami_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state.identity.find_user(auth.user_id).await?;
    Ok(ApiResponse::success(user))
}
