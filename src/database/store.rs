use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Folder, NewUser, Note, NoteChanges, NoteDraft, NoteFilter, Tag, User,
};

/// Persistent store seam.
///
/// Every folder, tag and note operation takes the owning user's id and only ever
/// sees rows stamped with it. Name uniqueness is enforced by the store itself and
/// reported as [`DatabaseError::UniqueViolation`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // users
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    // folders
    async fn list_folders(&self, owner: Uuid) -> Result<Vec<Folder>, DatabaseError>;
    async fn find_folder(&self, owner: Uuid, id: Uuid) -> Result<Option<Folder>, DatabaseError>;
    async fn insert_folder(&self, owner: Uuid, name: &str) -> Result<Folder, DatabaseError>;
    async fn rename_folder(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Folder>, DatabaseError>;
    async fn delete_folder(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
    /// Clears `folder_id` on the owner's notes that point at `folder_id`.
    async fn detach_folder(&self, owner: Uuid, folder_id: Uuid) -> Result<u64, DatabaseError>;

    // tags
    async fn list_tags(&self, owner: Uuid) -> Result<Vec<Tag>, DatabaseError>;
    async fn find_tag(&self, owner: Uuid, id: Uuid) -> Result<Option<Tag>, DatabaseError>;
    /// Number of distinct tags owned by `owner` whose id is in `ids`.
    async fn count_tags(&self, owner: Uuid, ids: &[Uuid]) -> Result<i64, DatabaseError>;
    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, DatabaseError>;
    async fn rename_tag(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Tag>, DatabaseError>;
    async fn delete_tag(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
    /// Removes `tag_id` from the tag sets of the owner's notes.
    async fn detach_tag(&self, owner: Uuid, tag_id: Uuid) -> Result<u64, DatabaseError>;

    // notes
    async fn list_notes(&self, owner: Uuid, filter: &NoteFilter) -> Result<Vec<Note>, DatabaseError>;
    async fn find_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError>;
    async fn insert_note(&self, owner: Uuid, draft: NoteDraft) -> Result<Note, DatabaseError>;
    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, DatabaseError>;
    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
}
