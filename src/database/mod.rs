pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;

/// Open the configured store backend, applying migrations when asked to.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
