// handlers/protected/notes.rs - /api/notes[/:id]

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{Note, NoteFilter};
use crate::error::ApiError;
use crate::handlers::utils::{parse_filter_id, parse_id, ApiJson, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

impl NotesQuery {
    fn into_filter(self) -> Result<NoteFilter, ApiError> {
        Ok(NoteFilter {
            search_term: self.search_term.filter(|term| !term.is_empty()),
            folder_id: parse_filter_id(self.folder_id.as_deref(), "folderId")?,
            tag_id: parse_filter_id(self.tag_id.as_deref(), "tagId")?,
        })
    }
}

/// GET /api/notes?searchTerm=&folderId=&tagId= - newest first
pub async fn notes_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<NotesQuery>,
) -> ApiResult<Vec<Note>> {
    let filter = query.into_filter()?;
    Ok(ApiResponse::success(state.notes().list(auth.user_id, &filter).await?))
}

pub async fn note_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.notes().get(auth.user_id, id).await?))
}

/// POST /api/notes - folder and tag references are checked before the insert
pub async fn notes_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Note> {
    let note = state.notes().create(auth.user_id, &body).await?;
    let location = format!("/api/notes/{}", note.id);
    Ok(ApiResponse::created(note, location))
}

pub async fn note_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Note> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.notes().update(auth.user_id, id, &body).await?))
}

pub async fn note_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.notes().delete(auth.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
