use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    #[serde(rename = "tags")]
    pub tag_ids: Vec<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note about to be inserted. References have already been validated.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update of a note. `None` leaves the column unchanged; for the nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
    pub folder_id: Option<Option<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.folder_id.is_none()
            && self.tag_ids.is_none()
    }
}

/// Filters for listing notes. All present filters apply together.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    /// Case-insensitive substring matched against title or content
    pub search_term: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl NoteFilter {
    /// Whether `note` passes every filter. Owner scoping is the caller's job.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(term) = &self.search_term {
            let needle = term.to_lowercase();
            let in_title = note.title.to_lowercase().contains(&needle);
            let in_content = note
                .content
                .as_deref()
                .map(|c| c.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_content {
                return false;
            }
        }
        if let Some(folder_id) = self.folder_id {
            if note.folder_id != Some(folder_id) {
                return false;
            }
        }
        if let Some(tag_id) = self.tag_id {
            if !note.tag_ids.contains(&tag_id) {
                return false;
            }
        }
        true
    }
}
