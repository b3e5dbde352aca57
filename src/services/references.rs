use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::database::Store;
use crate::services::{ReferenceError, ServiceError};

/// Syntax-only check of a `folderId` value. Absent, null and `""` all mean "no folder".
pub fn parse_folder_ref(value: Option<&Value>) -> Result<Option<Uuid>, ReferenceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| ReferenceError::InvalidId("folderId")),
        Some(_) => Err(ReferenceError::InvalidId("folderId")),
    }
}

/// Syntax-only check of a `tags` value. Duplicates are kept.
pub fn parse_tag_refs(value: Option<&Value>) -> Result<Vec<Uuid>, ReferenceError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or(ReferenceError::InvalidId("tags"))
            })
            .collect(),
        Some(_) => Err(ReferenceError::NotAnArray),
    }
}

/// Confirms that the folder and tags a note points at belong to the acting user.
#[derive(Clone)]
pub struct ReferenceValidator {
    store: Arc<dyn Store>,
}

impl ReferenceValidator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn validate_folder_ref(
        &self,
        value: Option<&Value>,
        owner: Uuid,
    ) -> Result<Option<Uuid>, ServiceError> {
        let Some(folder_id) = parse_folder_ref(value)? else {
            return Ok(None);
        };

        if self.store.find_folder(owner, folder_id).await?.is_none() {
            warn!("Rejected folder reference {} for user {}", folder_id, owner);
            return Err(ReferenceError::FolderNotFound.into());
        }
        Ok(Some(folder_id))
    }

    /// One counting query: every id must match a tag of `owner`, so a repeated id
    /// makes the count fall short.
    pub async fn validate_tag_refs(
        &self,
        value: Option<&Value>,
        owner: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let tag_ids = parse_tag_refs(value)?;
        if tag_ids.is_empty() {
            return Ok(tag_ids);
        }

        let found = self.store.count_tags(owner, &tag_ids).await?;
        if found != tag_ids.len() as i64 {
            warn!(
                "Rejected tag references for user {}: {} of {} found",
                owner,
                found,
                tag_ids.len()
            );
            return Err(ReferenceError::TagNotFound.into());
        }
        Ok(tag_ids)
    }

    /// Both checks run concurrently; the first failure wins.
    pub async fn validate_note_refs(
        &self,
        folder: Option<&Value>,
        tags: Option<&Value>,
        owner: Uuid,
    ) -> Result<(Option<Uuid>, Vec<Uuid>), ServiceError> {
        futures::try_join!(
            self.validate_folder_ref(folder, owner),
            self.validate_tag_refs(tags, owner)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[test]
    fn empty_folder_values_mean_no_folder() {
        assert_eq!(parse_folder_ref(None), Ok(None));
        assert_eq!(parse_folder_ref(Some(&Value::Null)), Ok(None));
        assert_eq!(parse_folder_ref(Some(&json!(""))), Ok(None));
    }

    #[test]
    fn malformed_folder_values_are_invalid_ids() {
        assert_eq!(
            parse_folder_ref(Some(&json!("not-a-uuid"))),
            Err(ReferenceError::InvalidId("folderId"))
        );
        assert_eq!(
            parse_folder_ref(Some(&json!(12))),
            Err(ReferenceError::InvalidId("folderId"))
        );
    }

    #[test]
    fn tags_must_be_an_array_of_uuids() {
        assert_eq!(parse_tag_refs(Some(&json!("abc"))), Err(ReferenceError::NotAnArray));
        assert_eq!(
            parse_tag_refs(Some(&json!([Uuid::new_v4().to_string(), "nope"]))),
            Err(ReferenceError::InvalidId("tags"))
        );
        assert_eq!(parse_tag_refs(Some(&json!([]))), Ok(vec![]));
    }

    #[tokio::test]
    async fn foreign_folder_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let folder = store.insert_folder(bob, "Bob's").await.unwrap();
        let validator = ReferenceValidator::new(store);

        let value = json!(folder.id.to_string());
        let result = validator.validate_folder_ref(Some(&value), alice).await;
        assert!(matches!(
            result,
            Err(ServiceError::Reference(ReferenceError::FolderNotFound))
        ));
        assert_eq!(
            validator.validate_folder_ref(Some(&value), bob).await.unwrap(),
            Some(folder.id)
        );
    }

    #[tokio::test]
    async fn duplicate_tag_ids_fail() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let tag = store.insert_tag(owner, "work").await.unwrap();
        let validator = ReferenceValidator::new(store);

        let once = json!([tag.id.to_string()]);
        assert_eq!(
            validator.validate_tag_refs(Some(&once), owner).await.unwrap(),
            vec![tag.id]
        );

        let twice = json!([tag.id.to_string(), tag.id.to_string()]);
        assert!(matches!(
            validator.validate_tag_refs(Some(&twice), owner).await,
            Err(ServiceError::Reference(ReferenceError::TagNotFound))
        ));
    }

    #[tokio::test]
    async fn joined_validation_fails_if_either_side_fails() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let folder = store.insert_folder(owner, "Work").await.unwrap();
        let validator = ReferenceValidator::new(store);

        let folder_value = json!(folder.id.to_string());
        let unknown_tags = json!([Uuid::new_v4().to_string()]);
        let result = validator
            .validate_note_refs(Some(&folder_value), Some(&unknown_tags), owner)
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Reference(ReferenceError::TagNotFound))
        ));

        let (folder_id, tags) = validator
            .validate_note_refs(Some(&folder_value), None, owner)
            .await
            .unwrap();
        assert_eq!(folder_id, Some(folder.id));
        assert!(tags.is_empty());
    }
}
