//! Test helpers: build the full router against a temporary public directory.

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use helping_hands::{
    adapters::{repositories::InMemorySessionRepository, router::build_router, state::AppState},
    application::{
        repositories::session_repository::SessionRepository,
        services::{UploadPolicy, UploadService},
    },
    domain::{config::local::LocalConfig, models::file::IMAGE_FIELD},
    services,
};
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub sessions: Arc<InMemorySessionRepository>,
    pub config: LocalConfig,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.config.upload_dir()
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir())
            .expect("upload dir should exist")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    pub fn session_cookie(&self, session_id: &str) -> String {
        format!("{}={}", self.config.session_cookie, session_id)
    }
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = LocalConfig {
        public_dir: temp_dir.path().join("public"),
        ..LocalConfig::default()
    };
    std::fs::create_dir_all(config.images_dir()).expect("Failed to create images dir");

    let storage_service = services::create_storage_service(&config)
        .await
        .expect("Failed to create storage service");
    let upload_service = UploadService::new(
        UploadPolicy::new(IMAGE_FIELD, config.max_upload_bytes),
        storage_service,
    );
    let sessions = Arc::new(InMemorySessionRepository::new(Duration::from_secs(
        config.session_ttl_secs,
    )));

    let app_state = AppState {
        config: Arc::new(config.clone()),
        upload_service: Arc::new(upload_service),
        session_repository: sessions.clone() as Arc<dyn SessionRepository>,
    };

    let server = TestServer::new(build_router(app_state)).expect("Failed to create test server");

    TestApp {
        server,
        sessions,
        config,
        _temp_dir: temp_dir,
    }
}

/// A multipart form with one file part.
pub fn file_form(field: &str, file_name: &str, mime_type: &str, size: usize) -> MultipartForm {
    let part = Part::bytes(vec![0xAB; size])
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}
