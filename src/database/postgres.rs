use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Folder, NewUser, Note, NoteChanges, NoteDraft, NoteFilter, Tag, User,
};
use crate::database::store::Store;

const USER_COLUMNS: &str = "id, username, password_hash, fullname";
const NAMED_COLUMNS: &str = "id, name, user_id, created_at, updated_at";
const NOTE_COLUMNS: &str =
    "id, title, content, folder_id, tag_ids, user_id, created_at, updated_at";

/// Owner-scoped access to a `(id, name, user_id, ...)` table. Folders and tags
/// share this shape and the same `(name, user_id)` unique index.
struct NamedTable<T> {
    table_name: &'static str,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> NamedTable<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    const fn new(table_name: &'static str) -> Self {
        Self {
            table_name,
            _phantom: std::marker::PhantomData,
        }
    }

    async fn list(&self, pool: &PgPool, owner: Uuid) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY name ASC",
            NAMED_COLUMNS, self.table_name
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(owner).fetch_all(pool).await?)
    }

    async fn find(&self, pool: &PgPool, owner: Uuid, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND user_id = $2",
            NAMED_COLUMNS, self.table_name
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?)
    }

    async fn insert(&self, pool: &PgPool, owner: Uuid, name: &str) -> Result<T, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (id, name, user_id) VALUES ($1, $2, $3) RETURNING {}",
            self.table_name, NAMED_COLUMNS
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(owner)
            .fetch_one(pool)
            .await?)
    }

    async fn rename(
        &self,
        pool: &PgPool,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET name = $3, updated_at = now() WHERE id = $1 AND user_id = $2 RETURNING {}",
            self.table_name, NAMED_COLUMNS
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_optional(pool)
            .await?)
    }

    async fn delete(&self, pool: &PgPool, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", self.table_name);
        let result = sqlx::query(&sql).bind(id).bind(owner).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

const FOLDERS: NamedTable<Folder> = NamedTable::new("folders");
const TAGS: NamedTable<Tag> = NamedTable::new("tags");

/// Escapes `LIKE` wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// [`Store`] backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, fullname) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.fullname)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_folders(&self, owner: Uuid) -> Result<Vec<Folder>, DatabaseError> {
        FOLDERS.list(&self.pool, owner).await
    }

    async fn find_folder(&self, owner: Uuid, id: Uuid) -> Result<Option<Folder>, DatabaseError> {
        FOLDERS.find(&self.pool, owner, id).await
    }

    async fn insert_folder(&self, owner: Uuid, name: &str) -> Result<Folder, DatabaseError> {
        FOLDERS.insert(&self.pool, owner, name).await
    }

    async fn rename_folder(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Folder>, DatabaseError> {
        FOLDERS.rename(&self.pool, owner, id, name).await
    }

    async fn delete_folder(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        FOLDERS.delete(&self.pool, owner, id).await
    }

    async fn detach_folder(&self, owner: Uuid, folder_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notes SET folder_id = NULL, updated_at = now() WHERE user_id = $1 AND folder_id = $2",
        )
        .bind(owner)
        .bind(folder_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_tags(&self, owner: Uuid) -> Result<Vec<Tag>, DatabaseError> {
        TAGS.list(&self.pool, owner).await
    }

    async fn find_tag(&self, owner: Uuid, id: Uuid) -> Result<Option<Tag>, DatabaseError> {
        TAGS.find(&self.pool, owner, id).await
    }

    async fn count_tags(&self, owner: Uuid, ids: &[Uuid]) -> Result<i64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tags WHERE user_id = $1 AND id = ANY($2)")
                .bind(owner)
                .bind(ids)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    async fn insert_tag(&self, owner: Uuid, name: &str) -> Result<Tag, DatabaseError> {
        TAGS.insert(&self.pool, owner, name).await
    }

    async fn rename_tag(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Tag>, DatabaseError> {
        TAGS.rename(&self.pool, owner, id, name).await
    }

    async fn delete_tag(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        TAGS.delete(&self.pool, owner, id).await
    }

    async fn detach_tag(&self, owner: Uuid, tag_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notes SET tag_ids = array_remove(tag_ids, $2), updated_at = now() \
             WHERE user_id = $1 AND $2 = ANY(tag_ids)",
        )
        .bind(owner)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_notes(&self, owner: Uuid, filter: &NoteFilter) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            r"SELECT {} FROM notes
              WHERE user_id = $1
                AND ($2::text IS NULL OR title ILIKE $2 ESCAPE '\' OR content ILIKE $2 ESCAPE '\')
                AND ($3::uuid IS NULL OR folder_id = $3)
                AND ($4::uuid IS NULL OR $4 = ANY(tag_ids))
              ORDER BY updated_at DESC",
            NOTE_COLUMNS
        );
        debug!(
            "Listing notes: search={} folder={:?} tag={:?}",
            filter.search_term.is_some(),
            filter.folder_id,
            filter.tag_id
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(owner)
            .bind(filter.search_term.as_deref().map(like_pattern))
            .bind(filter.folder_id)
            .bind(filter.tag_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let sql = format!("SELECT {} FROM notes WHERE id = $1 AND user_id = $2", NOTE_COLUMNS);
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_note(&self, owner: Uuid, draft: NoteDraft) -> Result<Note, DatabaseError> {
        let sql = format!(
            "INSERT INTO notes (id, title, content, folder_id, tag_ids, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            NOTE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::new_v4())
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.folder_id)
            .bind(&draft.tag_ids)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, DatabaseError> {
        // Nullable columns carry a "was provided" flag so an explicit null can clear them.
        let sql = format!(
            "UPDATE notes SET
                title = COALESCE($3::text, title),
                content = CASE WHEN $4 THEN $5::text ELSE content END,
                folder_id = CASE WHEN $6 THEN $7::uuid ELSE folder_id END,
                tag_ids = COALESCE($8::uuid[], tag_ids),
                updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            NOTE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title)
            .bind(changes.content.is_some())
            .bind(changes.content.flatten())
            .bind(changes.folder_id.is_some())
            .bind(changes.folder_id.flatten())
            .bind(changes.tag_ids)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("gaga"), "%gaga%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern(r"c:\tmp"), r"%c:\\tmp%");
    }
}
