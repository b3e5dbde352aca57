// handlers/protected/tags.rs - /api/tags[/:id]

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::Tag;
use crate::handlers::utils::{parse_id, ApiJson, NameBody};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn tags_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.tags().list(auth.user_id).await?))
}

pub async fn tag_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Tag> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.tags().get(auth.user_id, id).await?))
}

pub async fn tags_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Tag> {
    let tag = state.tags().create(auth.user_id, body.name()).await?;
    let location = format!("/api/tags/{}", tag.id);
    Ok(ApiResponse::created(tag, location))
}

pub async fn tag_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Tag> {
    let id = parse_id(&id)?;
    let tag = state.tags().rename(auth.user_id, id, body.name()).await?;
    Ok(ApiResponse::success(tag))
}

pub async fn tag_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.tags().delete(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
