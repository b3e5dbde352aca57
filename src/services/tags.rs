use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::DeletePolicy;
use crate::database::models::Tag;
use crate::database::{DatabaseError, Store};
use crate::services::{require_name, ServiceError};

const DUPLICATE_TAG: &str = "The tag name already exists";

fn translate(err: DatabaseError) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::DuplicateName(DUPLICATE_TAG.to_string())
    } else {
        err.into()
    }
}

/// Tag CRUD scoped to one owner per call
#[derive(Clone)]
pub struct TagRepository {
    store: Arc<dyn Store>,
    delete_policy: DeletePolicy,
}

impl TagRepository {
    pub fn new(store: Arc<dyn Store>, delete_policy: DeletePolicy) -> Self {
        Self {
            store,
            delete_policy,
        }
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.store.list_tags(owner).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Tag, ServiceError> {
        self.store
            .find_tag(owner, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create(&self, owner: Uuid, name: Option<&str>) -> Result<Tag, ServiceError> {
        let name = require_name(name)?;
        let tag = self.store.insert_tag(owner, &name).await.map_err(translate)?;
        info!("Created tag {} for user {}", tag.id, owner);
        Ok(tag)
    }

    pub async fn rename(&self, owner: Uuid, id: Uuid, name: Option<&str>) -> Result<Tag, ServiceError> {
        let name = require_name(name)?;
        self.store
            .rename_tag(owner, id, &name)
            .await
            .map_err(translate)?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_tag(owner, id).await? {
            return Err(ServiceError::NotFound);
        }

        if self.delete_policy == DeletePolicy::Detach {
            let detached = self.store.detach_tag(owner, id).await?;
            info!("Deleted tag {}; removed from {} notes", id, detached);
        } else {
            info!("Deleted tag {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NoteDraft;
    use crate::database::MemoryStore;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_same_name_creates_admit_one() {
        let repo = TagRepository::new(Arc::new(MemoryStore::new()), DeletePolicy::Retain);
        let owner = Uuid::new_v4();
        let (first, second) = (repo.clone(), repo.clone());

        let (a, b) = tokio::join!(
            tokio::spawn(async move { first.create(owner, Some("urgent")).await }),
            tokio::spawn(async move { second.create(owner, Some("urgent")).await }),
        );
        let results = [a.unwrap(), b.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(ServiceError::DuplicateName(msg)) if msg == DUPLICATE_TAG))
                .count(),
            1
        );
        assert_eq!(repo.list(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn names_are_unique_per_owner_only() {
        let repo = TagRepository::new(Arc::new(MemoryStore::new()), DeletePolicy::Retain);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.create(alice, Some("urgent")).await.unwrap();
        repo.create(bob, Some("urgent")).await.unwrap();
        assert!(matches!(
            repo.create(alice, Some("urgent")).await,
            Err(ServiceError::DuplicateName(_))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let repo = TagRepository::new(Arc::new(MemoryStore::new()), DeletePolicy::Retain);
        let owner = Uuid::new_v4();
        for name in ["zeta", "alpha", "mu"] {
            repo.create(owner, Some(name)).await.unwrap();
        }
        let names: Vec<String> = repo.list(owner).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "mu", "zeta"]);
    }

    #[tokio::test]
    async fn detach_removes_deleted_tag_from_notes() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let repo = TagRepository::new(store.clone(), DeletePolicy::Detach);
        let owner = Uuid::new_v4();
        let keep = repo.create(owner, Some("keep")).await.unwrap();
        let drop = repo.create(owner, Some("drop")).await.unwrap();
        let note = store
            .insert_note(
                owner,
                NoteDraft {
                    title: "Tagged".into(),
                    tag_ids: vec![keep.id, drop.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        repo.delete(owner, drop.id).await.unwrap();

        let after = store.find_note(owner, note.id).await.unwrap().unwrap();
        assert_eq!(after.tag_ids, vec![keep.id]);
    }
}
