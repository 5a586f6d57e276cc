use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;

use crate::{
    application::services::StorageService, domain::models::file::StoredFile,
    services::error::StorageError,
};

/// Writes uploads into a single flat directory on the local disk.
pub struct LocalStorageService {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorageService {
    /// Creates `root` if it does not exist yet.
    ///
    /// # Arguments
    /// * `root` - Directory uploads are written to (e.g. `public/uploads`)
    /// * `url_prefix` - URL path the directory is served under (e.g. `/public/uploads`)
    pub async fn new(root: impl Into<PathBuf>, url_prefix: String) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    fn file_path(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(StorageError::InvalidKey(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }

    async fn write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        let mut file = fs::File::create(path).await?;
        file.write_all(content).await?;
        file.flush().await
    }
}

/// Deletes whatever a failed write left at `path`. A missing file is fine.
async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial upload {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<StoredFile, StorageError> {
        let path = self.file_path(file_name)?;

        if let Err(e) = Self::write(&path, content).await {
            remove_partial(&path).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            generated_file_name: file_name.to_string(),
            public_path: format!("{}/{}", self.url_prefix, file_name),
            storage_path: path,
            size_bytes: content.len() as u64,
        })
    }
}
