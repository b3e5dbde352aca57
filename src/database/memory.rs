use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Folder, NewUser, Note, NoteChanges, NoteDraft, NoteFilter, Tag, User,
};
use crate::database::store::Store;

/// In-process [`Store`] with the same unique-index semantics as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    folders: RwLock<HashMap<Uuid, Folder>>,
    tags: RwLock<HashMap<Uuid, Tag>>,
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Access to the name/owner fields shared by folders and tags.
trait Named {
    fn name(&self) -> &str;
    fn owner(&self) -> Uuid;
}

impl Named for Folder {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Uuid {
        self.user_id
    }
}

impl Named for Tag {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Uuid {
        self.user_id
    }
}

/// Emulates a `(name, user_id)` unique index, ignoring the row being renamed.
fn ensure_unique_name<T: Named>(
    rows: &HashMap<Uuid, T>,
    owner: Uuid,
    name: &str,
    except: Option<Uuid>,
    constraint: &str,
) -> Result<(), DatabaseError> {
    let taken = rows
        .iter()
        .any(|(id, row)| Some(*id) != except && row.owner() == owner && row.name() == name);
    if taken {
        return Err(DatabaseError::UniqueViolation(constraint.to_string()));
    }
    Ok(())
}

fn sorted_by_name<T: Named + Clone>(rows: &HashMap<Uuid, T>, owner: Uuid) -> Vec<T> {
    let mut list: Vec<T> = rows.values().filter(|r| r.owner() == owner).cloned().collect();
    list.sort_by(|a, b| a.name().cmp(b.name()));
    list
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            fullname: user.fullname,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_folders(&self, owner: Uuid) -> Result<Vec<Folder>, DatabaseError> {
        Ok(sorted_by_name(&*self.folders.read().await, owner))
    }

    async fn find_folder(&self, owner: Uuid, id: Uuid) -> Result<Option<Folder>, DatabaseError> {
        let folders = self.folders.read().await;
        Ok(folders.get(&id).filter(|f| f.user_id == owner).cloned())
    }

    async fn insert_folder(&self, owner: Uuid, name: &str) -> Result<Folder, DatabaseError> {
        let mut folders = self.folders.write().await;
        ensure_unique_name(&folders, owner, name, None, "folders_name_user_id_key")?;
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename_folder(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Folder>, DatabaseError> {
        let mut folders = self.folders.write().await;
        if !folders.get(&id).is_some_and(|f| f.user_id == owner) {
            return Ok(None);
        }
        ensure_unique_name(&folders, owner, name, Some(id), "folders_name_user_id_key")?;
        Ok(folders.get_mut(&id).map(|folder| {
            folder.name = name.to_string();
            folder.updated_at = Utc::now();
            folder.clone()
        }))
    }

    async fn delete_folder(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut folders = self.folders.write().await;
        if folders.get(&id).is_some_and(|f| f.user_id == owner) {
            folders.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn detach_folder(&self, owner: Uuid, folder_id: Uuid) -> Result<u64, DatabaseError> {
        let mut notes = self.notes.write().await;
        let now = Utc::now();
        let mut affected = 0;
        for note in notes
            .values_mut()
            .filter(|n| n.user_id == owner && n.folder_id == Some(folder_id))
        {
            note.folder_id = None;
            note.updated_at = now;
            affected += 1;
        }
        Ok(affected)
    }

    async fn list_tags(&self, owner: Uuid) -> Result<Vec<Tag>, DatabaseError> {
        Ok(sorted_by_name(&*self.tags.read().await, owner))
    }

    async fn find_tag(&self, owner: Uuid, id: Uuid) -> Result<Option<Tag>, DatabaseError> {
        let tags = self.tags.read().await;
        Ok(tags.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn count_tags(&self, owner: Uuid, ids: &[Uuid]) -> Result<i64, DatabaseError> {
        let tags = self.tags.read().await;
        let count = tags
            .values()
            .filter(|t| t.user_id == owner && ids.contains(&t.id))
            .count();
        Ok(count as i64)
    }

    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, DatabaseError> {
        let mut tags = self.tags.write().await;
        ensure_unique_name(&tags, owner, name, None, "tags_name_user_id_key")?;
        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn rename_tag(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Tag>, DatabaseError> {
        let mut tags = self.tags.write().await;
        if !tags.get(&id).is_some_and(|t| t.user_id == owner) {
            return Ok(None);
        }
        ensure_unique_name(&tags, owner, name, Some(id), "tags_name_user_id_key")?;
        Ok(tags.get_mut(&id).map(|tag| {
            tag.name = name.to_string();
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn delete_tag(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tags = self.tags.write().await;
        if tags.get(&id).is_some_and(|t| t.user_id == owner) {
            tags.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn detach_tag(&self, owner: Uuid, tag_id: Uuid) -> Result<u64, DatabaseError> {
        let mut notes = self.notes.write().await;
        let now = Utc::now();
        let mut affected = 0;
        for note in notes
            .values_mut()
            .filter(|n| n.user_id == owner && n.tag_ids.contains(&tag_id))
        {
            note.tag_ids.retain(|id| *id != tag_id);
            note.updated_at = now;
            affected += 1;
        }
        Ok(affected)
    }

    async fn list_notes(&self, owner: Uuid, filter: &NoteFilter) -> Result<Vec<Note>, DatabaseError> {
        let notes = self.notes.read().await;
        let mut list: Vec<Note> = notes
            .values()
            .filter(|n| n.user_id == owner && filter.matches(n))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn find_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let notes = self.notes.read().await;
        Ok(notes.get(&id).filter(|n| n.user_id == owner).cloned())
    }

    async fn insert_note(&self, owner: Uuid, draft: NoteDraft) -> Result<Note, DatabaseError> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            folder_id: draft.folder_id,
            tag_ids: draft.tag_ids,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.notes.write().await.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, DatabaseError> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes.get_mut(&id).filter(|n| n.user_id == owner) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        if let Some(folder_id) = changes.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(tag_ids) = changes.tag_ids {
            note.tag_ids = tag_ids;
        }
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut notes = self.notes.write().await;
        if notes.get(&id).is_some_and(|n| n.user_id == owner) {
            notes.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
