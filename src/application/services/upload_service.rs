use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    application::{error::UploadError, services::StorageService},
    domain::models::file::{
        file_extension, generate_file_name, is_allowed_image, StoredFile, UploadRequest,
        IMAGE_FIELD, MAX_IMAGE_BYTES,
    },
};

/// What a single upload must look like to be accepted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub field_name: String,
    pub max_file_size: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(IMAGE_FIELD, MAX_IMAGE_BYTES)
    }
}

impl UploadPolicy {
    pub fn new(field_name: impl Into<String>, max_file_size: u64) -> Self {
        Self {
            field_name: field_name.into(),
            max_file_size,
        }
    }

    pub fn check_field(&self, field_name: &str) -> Result<(), UploadError> {
        if field_name != self.field_name {
            return Err(UploadError::UnexpectedField(field_name.to_string()));
        }
        Ok(())
    }

    pub fn check_type(&self, file_name: &str, mime_type: &str) -> Result<(), UploadError> {
        let extension = file_extension(file_name).unwrap_or_default();
        if !is_allowed_image(extension, mime_type) {
            return Err(UploadError::InvalidFileType);
        }
        Ok(())
    }

    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.max_file_size {
            return Err(UploadError::FileTooLarge);
        }
        Ok(())
    }

    /// Runs every check in order; the first failure wins.
    pub fn validate(&self, request: &UploadRequest) -> Result<(), UploadError> {
        self.check_field(&request.field_name)?;
        self.check_type(&request.original_file_name, &request.declared_mime_type)?;
        self.check_size(request.byte_size())
    }
}

pub struct UploadService {
    policy: UploadPolicy,
    storage: Arc<dyn StorageService>,
}

impl UploadService {
    pub fn new(policy: UploadPolicy, storage: Arc<dyn StorageService>) -> Self {
        Self { policy, storage }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validates the request and, only if it passes, writes it under a
    /// generated name. `None` means the form carried no file.
    pub async fn process(&self, request: Option<UploadRequest>) -> Result<StoredFile, UploadError> {
        let request = request.ok_or(UploadError::NoFileSelected)?;

        if let Err(e) = self.policy.validate(&request) {
            warn!(
                "Rejected upload '{}' ({}, {} bytes): {:?}",
                request.original_file_name,
                request.declared_mime_type,
                request.byte_size(),
                e
            );
            return Err(e);
        }

        let file_name = generate_file_name(
            &request.field_name,
            Utc::now().timestamp_millis(),
            &request.original_file_name,
        );

        let stored = self
            .storage
            .store(&file_name, &request.content)
            .await
            .map_err(|e| {
                error!("Failed to store upload '{}': {}", file_name, e);
                UploadError::from(e)
            })?;

        info!(
            "Stored upload '{}' as {} ({} bytes)",
            request.original_file_name,
            stored.storage_path.display(),
            stored.size_bytes
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use super::*;
    use crate::services::{LocalStorageService, StorageError};

    fn image(name: &str, mime: &str, size: usize) -> UploadRequest {
        UploadRequest::new(
            IMAGE_FIELD.to_string(),
            name.to_string(),
            mime.to_string(),
            vec![7u8; size],
        )
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    async fn service_in(dir: &Path) -> UploadService {
        let storage = LocalStorageService::new(dir, "/public/uploads".to_string())
            .await
            .unwrap();
        UploadService::new(UploadPolicy::default(), Arc::new(storage))
    }

    struct FailingStorage;

    #[async_trait]
    impl StorageService for FailingStorage {
        async fn store(&self, _: &str, _: &[u8]) -> Result<StoredFile, StorageError> {
            Err(StorageError::WriteFailed("disk full".to_string()))
        }
    }

    #[test]
    fn test_policy_checks_type_before_size() {
        let policy = UploadPolicy::default();
        let request = image("movie.mp4", "video/mp4", 2_000_000);
        assert_eq!(policy.validate(&request), Err(UploadError::InvalidFileType));
    }

    #[test]
    fn test_policy_rejects_other_fields() {
        let policy = UploadPolicy::default();
        let mut request = image("cat.png", "image/png", 10);
        request.field_name = "avatar".to_string();
        assert_eq!(
            policy.validate(&request),
            Err(UploadError::UnexpectedField("avatar".to_string()))
        );
    }

    #[test]
    fn test_policy_size_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.check_size(1_000_000).is_ok());
        assert_eq!(policy.check_size(1_000_001), Err(UploadError::FileTooLarge));
    }

    #[tokio::test]
    async fn test_missing_file_writes_nothing() {
        let dir = tempdir().unwrap();
        let service = service_in(dir.path()).await;

        let result = service.process(None).await;

        assert_eq!(result, Err(UploadError::NoFileSelected));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_disallowed_extension_writes_nothing() {
        let dir = tempdir().unwrap();
        let service = service_in(dir.path()).await;

        let result = service
            .process(Some(image("report.pdf", "application/pdf", 100)))
            .await;

        assert_eq!(result, Err(UploadError::InvalidFileType));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_mime_type_checked_independently_of_extension() {
        let dir = tempdir().unwrap();
        let service = service_in(dir.path()).await;

        let result = service
            .process(Some(image("cat.png", "application/x-msdownload", 100)))
            .await;

        assert_eq!(result, Err(UploadError::InvalidFileType));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_writes_nothing() {
        let dir = tempdir().unwrap();
        let service = service_in(dir.path()).await;

        let result = service
            .process(Some(image("big.gif", "image/gif", 1_000_001)))
            .await;

        assert_eq!(result, Err(UploadError::FileTooLarge));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_accepted_upload_is_written() {
        let dir = tempdir().unwrap();
        let service = service_in(dir.path()).await;

        let stored = service
            .process(Some(image("Dog.JPG", "image/jpeg", 500)))
            .await
            .unwrap();

        assert!(stored.generated_file_name.starts_with("myImage-"));
        assert!(stored.generated_file_name.ends_with(".JPG"));
        assert_eq!(stored.size_bytes, 500);
        assert_eq!(
            stored.public_path,
            format!("/public/uploads/{}", stored.generated_file_name)
        );
        assert_eq!(std::fs::read(&stored.storage_path).unwrap().len(), 500);
        assert_eq!(file_count(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_upload_error() {
        let service = UploadService::new(UploadPolicy::default(), Arc::new(FailingStorage));

        let result = service.process(Some(image("cat.png", "image/png", 10))).await;

        assert!(matches!(result, Err(UploadError::StorageWriteFailure(_))));
    }
}
