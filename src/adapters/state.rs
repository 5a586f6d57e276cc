use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    application::{repositories::session_repository::SessionRepository, services::UploadService},
    domain::config::local::LocalConfig,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<LocalConfig>,
    pub upload_service: Arc<UploadService>,
    pub session_repository: Arc<dyn SessionRepository>,
}
