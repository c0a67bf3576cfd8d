pub mod models;
pub mod repository;

use async_trait::async_trait;
use thiserror::Error;

pub use models::profile::{LocalProfile, NewProfile, Role};
pub use repository::PgProfileStore;

/// Errors from the local profile store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Duplicate profile: {0}")]
    Duplicate(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Local profile persistence, kept apart from provider-managed auth state
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: NewProfile) -> Result<LocalProfile, StorageError>;

    async fn profile_by_email(&self, email: &str) -> Result<Option<LocalProfile>, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}
