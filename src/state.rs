use std::sync::Arc;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::{PasswordHasher, TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::{open_store, DatabaseError, Store};
use crate::services::{FolderRepository, IdentityService, NoteRepository, TagRepository};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("token service: {0}")]
    Token(#[from] TokenError),

    #[error("password hasher: {0}")]
    Password(#[from] PasswordError),

    #[error("store: {0}")]
    Database(#[from] DatabaseError),
}

/// Shared, read-only handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub identity: IdentityService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, StartupError> {
        let tokens = TokenService::new(&config.security)?;
        let hasher = PasswordHasher::new(config.security.bcrypt_cost)?;
        let identity = IdentityService::new(store.clone(), hasher);

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            identity,
        })
    }

    /// Open the configured store and build the state around it
    pub async fn open(config: AppConfig) -> Result<Self, StartupError> {
        let store = open_store(&config).await?;
        Self::new(config, store)
    }

    pub fn folders(&self) -> FolderRepository {
        FolderRepository::new(self.store.clone(), self.config.notes.delete_policy)
    }

    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.store.clone(), self.config.notes.delete_policy)
    }

    pub fn notes(&self) -> NoteRepository {
        NoteRepository::new(self.store.clone())
    }
}
