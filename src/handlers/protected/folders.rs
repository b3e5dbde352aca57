// handlers/protected/folders.rs - /api/folders[/:id]

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::Folder;
use crate::handlers::utils::{parse_id, ApiJson, NameBody};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/folders - the caller's folders by name
pub async fn folders_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Folder>> {
    Ok(ApiResponse::success(state.folders().list(auth.user_id).await?))
}

pub async fn folder_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Folder> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.folders().get(auth.user_id, id).await?))
}

pub async fn folders_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Folder> {
    let folder = state.folders().create(auth.user_id, body.name()).await?;
    let location = format!("/api/folders/{}", folder.id);
    Ok(ApiResponse::created(folder, location))
}

pub async fn folder_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Folder> {
    let id = parse_id(&id)?;
    let folder = state.folders().rename(auth.user_id, id, body.name()).await?;
    Ok(ApiResponse::success(folder))
}

/// DELETE /api/folders/:id - notes keep or lose the reference per the delete policy
pub async fn folder_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.folders().delete(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
