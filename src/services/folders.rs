use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::DeletePolicy;
use crate::database::models::Folder;
use crate::database::{DatabaseError, Store};
use crate::services::{require_name, ServiceError};

const DUPLICATE_FOLDER: &str = "The folder name already exists";

fn translate(err: DatabaseError) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::DuplicateName(DUPLICATE_FOLDER.to_string())
    } else {
        err.into()
    }
}

/// Folder CRUD scoped to one owner per call
#[derive(Clone)]
pub struct FolderRepository {
    store: Arc<dyn Store>,
    delete_policy: DeletePolicy,
}

impl FolderRepository {
    pub fn new(store: Arc<dyn Store>, delete_policy: DeletePolicy) -> Self {
        Self {
            store,
            delete_policy,
        }
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Folder>, ServiceError> {
        Ok(self.store.list_folders(owner).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Folder, ServiceError> {
        self.store
            .find_folder(owner, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create(&self, owner: Uuid, name: Option<&str>) -> Result<Folder, ServiceError> {
        let name = require_name(name)?;
        let folder = self.store.insert_folder(owner, &name).await.map_err(translate)?;
        info!("Created folder {} for user {}", folder.id, owner);
        Ok(folder)
    }

    pub async fn rename(
        &self,
        owner: Uuid,
        id: Uuid,
        name: Option<&str>,
    ) -> Result<Folder, ServiceError> {
        let name = require_name(name)?;
        self.store
            .rename_folder(owner, id, &name)
            .await
            .map_err(translate)?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_folder(owner, id).await? {
            return Err(ServiceError::NotFound);
        }

        if self.delete_policy == DeletePolicy::Detach {
            let detached = self.store.detach_folder(owner, id).await?;
            info!("Deleted folder {}; detached {} notes", id, detached);
        } else {
            info!("Deleted folder {}", id);
        }
        Ok(())
    }
}
