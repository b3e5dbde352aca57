use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub fullname: Option<String>,
}

/// Insert payload for `users`; the hash is computed before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub fullname: Option<String>,
}
