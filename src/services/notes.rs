use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{Note, NoteChanges, NoteDraft, NoteFilter};
use crate::database::Store;
use crate::services::references::ReferenceValidator;
use crate::services::ServiceError;

fn as_object(body: &Value) -> Result<&Map<String, Value>, ServiceError> {
    body.as_object()
        .ok_or_else(|| ServiceError::validation("Request body must be a JSON object"))
}

fn title_field(value: &Value) -> Result<String, ServiceError> {
    match value.as_str() {
        Some(title) if !title.trim().is_empty() => Ok(title.to_string()),
        _ => Err(ServiceError::validation("Missing `title` in request body")),
    }
}

fn content_field(value: Option<&Value>) -> Result<Option<String>, ServiceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ServiceError::validation("The `content` must be a string")),
    }
}

/// Note CRUD scoped to one owner per call. Writes go through the reference
/// validator first; nothing is written when it fails.
#[derive(Clone)]
pub struct NoteRepository {
    store: Arc<dyn Store>,
    references: ReferenceValidator,
}

impl NoteRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let references = ReferenceValidator::new(store.clone());
        Self { store, references }
    }

    pub async fn list(&self, owner: Uuid, filter: &NoteFilter) -> Result<Vec<Note>, ServiceError> {
        Ok(self.store.list_notes(owner, filter).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Note, ServiceError> {
        self.store
            .find_note(owner, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create(&self, owner: Uuid, body: &Value) -> Result<Note, ServiceError> {
        let object = as_object(body)?;
        let title = title_field(object.get("title").unwrap_or(&Value::Null))?;
        let content = content_field(object.get("content"))?;

        let (folder_id, tag_ids) = self
            .references
            .validate_note_refs(object.get("folderId"), object.get("tags"), owner)
            .await?;

        let note = self
            .store
            .insert_note(
                owner,
                NoteDraft {
                    title,
                    content,
                    folder_id,
                    tag_ids,
                },
            )
            .await?;
        info!("Created note {} for user {}", note.id, owner);
        Ok(note)
    }

    /// Patch update: absent fields are left alone, `null` clears `content` and `folderId`,
    /// `tags` replaces the whole set.
    pub async fn update(&self, owner: Uuid, id: Uuid, body: &Value) -> Result<Note, ServiceError> {
        // Resolve ownership before looking at the body.
        let current = self.get(owner, id).await?;
        let object = as_object(body)?;

        let mut changes = NoteChanges {
            title: object.get("title").map(title_field).transpose()?,
            ..Default::default()
        };
        if object.contains_key("content") {
            changes.content = Some(content_field(object.get("content"))?);
        }

        let (folder_id, tag_ids) = self
            .references
            .validate_note_refs(object.get("folderId"), object.get("tags"), owner)
            .await?;
        if object.contains_key("folderId") {
            changes.folder_id = Some(folder_id);
        }
        if object.contains_key("tags") {
            changes.tag_ids = Some(tag_ids);
        }

        if changes.is_empty() {
            debug!("Empty update for note {}", id);
            return Ok(current);
        }

        self.store
            .update_note(owner, id, changes)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_note(owner, id).await? {
            return Err(ServiceError::NotFound);
        }
        info!("Deleted note {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::ReferenceError;
    use serde_json::json;

    fn setup() -> (Arc<dyn Store>, NoteRepository) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        (store.clone(), NoteRepository::new(store))
    }

    #[tokio::test]
    async fn create_requires_title() {
        let (_, repo) = setup();
        let owner = Uuid::new_v4();
        assert!(matches!(
            repo.create(owner, &json!({ "content": "no title" })).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            repo.create(owner, &json!({ "title": "" })).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn foreign_folder_blocks_the_write() {
        let (store, repo) = setup();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let bobs = store.insert_folder(bob, "Bob").await.unwrap();

        let result = repo
            .create(alice, &json!({ "title": "Sneaky", "folderId": bobs.id.to_string() }))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Reference(ReferenceError::FolderNotFound))
        ));
        assert!(repo.list(alice, &NoteFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let (store, repo) = setup();
        let owner = Uuid::new_v4();
        let tag = store.insert_tag(owner, "work").await.unwrap();
        let note = repo
            .create(owner, &json!({ "title": "Before", "tags": [tag.id.to_string()] }))
            .await
            .unwrap();

        let result = repo
            .update(
                owner,
                note.id,
                &json!({ "title": "After", "tags": [tag.id.to_string(), Uuid::new_v4().to_string()] }),
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Reference(ReferenceError::TagNotFound))
        ));

        let unchanged = repo.get(owner, note.id).await.unwrap();
        assert_eq!(unchanged.title, "Before");
        assert_eq!(unchanged.tag_ids, vec![tag.id]);
    }

    #[tokio::test]
    async fn update_clears_folder_and_content_on_null() {
        let (store, repo) = setup();
        let owner = Uuid::new_v4();
        let folder = store.insert_folder(owner, "Work").await.unwrap();
        let note = repo
            .create(
                owner,
                &json!({ "title": "Plan", "content": "body", "folderId": folder.id.to_string() }),
            )
            .await
            .unwrap();

        let updated = repo
            .update(owner, note.id, &json!({ "folderId": "", "content": null }))
            .await
            .unwrap();
        assert_eq!(updated.title, "Plan");
        assert_eq!(updated.folder_id, None);
        assert_eq!(updated.content, None);
    }

    #[tokio::test]
    async fn update_of_someone_elses_note_is_not_found() {
        let (_, repo) = setup();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let note = repo.create(alice, &json!({ "title": "Mine" })).await.unwrap();

        assert!(matches!(
            repo.update(bob, note.id, &json!({ "title": "Yours" })).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(repo.delete(bob, note.id).await, Err(ServiceError::NotFound)));
        assert_eq!(repo.get(alice, note.id).await.unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn foreign_note_is_not_found_even_with_bad_references() {
        let (_, repo) = setup();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let note = repo.create(alice, &json!({ "title": "Mine" })).await.unwrap();

        for body in [
            json!({ "title": "x", "tags": [Uuid::new_v4().to_string()] }),
            json!({ "folderId": "not-a-uuid" }),
            json!({ "title": "" }),
        ] {
            assert!(matches!(
                repo.update(bob, note.id, &body).await,
                Err(ServiceError::NotFound)
            ));
        }
    }
}
