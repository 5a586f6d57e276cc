mod storage_service;
mod upload_service;

pub use storage_service::StorageService;
pub use upload_service::{UploadPolicy, UploadService};
