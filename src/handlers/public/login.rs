// handlers/public/login.rs - POST /api/login

use axum::extract::State;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::handlers::utils::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn credential<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request(format!("Missing '{}' in request body", field)))
}

/// Exchange username and password for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<TokenResponse> {
    let username = credential(&body, "username")?;
    let password = credential(&body, "password")?;

    let user = state.identity.verify_credentials(username, password).await?;
    let token = state.tokens.issue(&Identity::from(&user))?;

    info!("User {} logged in", user.username);
    Ok(ApiResponse::success(TokenResponse { token }))
}
