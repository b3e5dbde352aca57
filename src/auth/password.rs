use bcrypt::{hash, verify, BcryptError};
use thiserror::Error;
use tokio::task::{self, JoinError};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] JoinError),
}

/// bcrypt hashing on the blocking pool.
///
/// Holds a hash of a throwaway password so that a login for an unknown user
/// costs the same work as one for a real user.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = hash("noteful-dummy-password", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        Ok(task::spawn_blocking(move || hash(password, cost)).await??)
    }

    pub async fn verify(&self, password: &str, hashed: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let hashed = hashed.to_owned();
        Ok(task::spawn_blocking(move || verify(password, &hashed)).await??)
    }

    /// Burn one verification against the dummy hash; the result is always false.
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, PasswordError> {
        self.verify(password, &self.dummy_hash).await?;
        Ok(false)
    }
}
