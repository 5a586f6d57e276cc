use std::{sync::Arc, time::Duration};

use helping_hands::{
    adapters::{
        repositories::{InMemorySessionRepository, RedisSessionRepository},
        router::build_router,
        state::AppState,
    },
    application::{
        repositories::session_repository::SessionRepository,
        services::{UploadPolicy, UploadService},
    },
    domain::{config::local::LocalConfig, models::file::IMAGE_FIELD},
    services,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // variables.env is optional; real environment variables win
    let _ = dotenvy::from_filename("variables.env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "helping_hands=info".into()),
        )
        .init();

    let config = LocalConfig::from_env().expect("ERROR: Invalid configuration");

    tracing::info!(
        "Starting helping-hands, uploads go to {}",
        config.upload_dir().display()
    );

    let session_repository: Arc<dyn SessionRepository> = match &config.redis_url {
        Some(redis_url) => {
            let redis_client = redis::Client::open(redis_url.as_str())
                .expect("ERROR: Failed to create Redis client. Check REDIS_URL format.");
            let redis_conn_manager = redis::aio::ConnectionManager::new(redis_client)
                .await
                .expect("ERROR: Failed to connect to Redis. Check REDIS_URL and network connectivity.");
            tracing::info!("Using Redis session store");
            Arc::new(RedisSessionRepository::new(
                redis_conn_manager,
                config.session_ttl_secs,
            ))
        }
        None => {
            tracing::warn!("REDIS_URL not set, sessions are kept in memory");
            Arc::new(InMemorySessionRepository::new(Duration::from_secs(
                config.session_ttl_secs,
            )))
        }
    };

    let storage_service = services::create_storage_service(&config)
        .await
        .expect("Failed to create storage service");

    let upload_service = UploadService::new(
        UploadPolicy::new(IMAGE_FIELD, config.max_upload_bytes),
        storage_service,
    );

    let port = config.port;
    let app_state = AppState {
        config: Arc::new(config),
        upload_service: Arc::new(upload_service),
        session_repository,
    };

    let router = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
