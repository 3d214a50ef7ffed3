use thiserror::Error;

/// Storage errors shared by every DocuApp storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Duplicate: {0}")]
    Duplicate(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Export error: {0}")]
    Export(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Map a write error, turning UNIQUE constraint violations into `Duplicate`
    pub fn on_write(err: sqlx::Error, duplicate_message: impl Into<String>) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false);

        if is_unique {
            Self::Duplicate(duplicate_message.into())
        } else {
            Self::Sqlx(err)
        }
    }
}
