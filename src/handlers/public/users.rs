// handlers/public/users.rs - POST /api/users

use axum::extract::State;
use serde_json::Value;

use crate::database::models::User;
use crate::handlers::utils::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Registration;
use crate::state::AppState;

/// Create an account. Format problems are 422 with the offending field as `location`.
pub async fn users_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<User> {
    let registration = Registration::from_json(&body)?;
    let user = state.identity.register(registration).await?;
    let location = format!("/api/users/{}", user.id);
    Ok(ApiResponse::created(user, location))
}
