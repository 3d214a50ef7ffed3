// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and every storage layer

use std::path::PathBuf;
use std::sync::Arc;

use docuapp_documents::{CatalogStorage, DocumentStorage};
use docuapp_journal::JournalStorage;
use docuapp_storage::StorageError;
use docuapp_topman::TopManStorage;
use docuapp_users::UserStorage;
use sqlx::SqlitePool;
use tracing::info;

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub journal_storage: Arc<JournalStorage>,
    pub topman_storage: Arc<TopManStorage>,
    pub document_storage: Arc<DocumentStorage>,
    pub catalog_storage: Arc<CatalogStorage>,
}

impl DbState {
    /// Create new database state from a migrated SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            journal_storage: Arc::new(JournalStorage::new(pool.clone())),
            topman_storage: Arc::new(TopManStorage::new(pool.clone())),
            document_storage: Arc::new(DocumentStorage::new(pool.clone())),
            catalog_storage: Arc::new(CatalogStorage::new(pool.clone())),
            pool,
        }
    }

    /// Initialize database state with the default database location
    pub async fn init() -> Result<Self, StorageError> {
        Self::init_with_path(None).await
    }

    /// Initialize database state with optional custom database path
    pub async fn init_with_path(database_path: Option<PathBuf>) -> Result<Self, StorageError> {
        let database_path = database_path.unwrap_or_else(docuapp_core::database_file);
        let pool = docuapp_storage::connect(&database_path).await?;

        info!("Database ready at {}", database_path.display());
        Ok(Self::new(pool))
    }

    /// In-memory state, used by tests
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = docuapp_storage::connect_in_memory().await?;
        Ok(Self::new(pool))
    }
}
