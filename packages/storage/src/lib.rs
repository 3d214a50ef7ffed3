// ABOUTME: Data layer and persistence for DocuApp
// ABOUTME: Shared storage error type, SQLite pool setup, and schema migrations

pub mod error;
pub mod pool;

pub use error::{StorageError, StorageResult};
pub use pool::{connect, connect_in_memory, like_pattern};

// Re-export so downstream crates agree on one sqlx version
pub use sqlx;
