use async_trait::async_trait;

use crate::{domain::models::file::StoredFile, services::StorageError};

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes `content` under `file_name`. On failure nothing is left behind.
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<StoredFile, StorageError>;
}
