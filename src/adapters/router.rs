use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit, handler::HandlerWithoutStateExt, middleware, routing::get, Router,
};
use tower_http::services::ServeDir;

use crate::{
    adapters::{
        controllers::upload_controller::UploadController,
        middleware::{load_request_context, log_request, override_method},
        routing::VerbRules,
        state::AppState,
    },
    application::error::ApplicationError,
};

/// Room left in the request body limit for multipart boundaries and part
/// headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();
    let upload_body_limit =
        (config.max_upload_bytes as usize).saturating_add(MULTIPART_OVERHEAD_BYTES);

    let donation_routes = Router::new()
        .route(
            "/donations/upload",
            get(UploadController::show_upload_form)
                .post(UploadController::upload_image)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            load_request_context,
        ))
        .with_state(app_state);

    // Static files are added after the layers so they skip session lookup
    // and request logging.
    let app = donation_routes
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .fallback_service(
            ServeDir::new(config.images_dir()).not_found_service(not_found.into_service()),
        );

    with_method_override(app, VerbRules::donations())
}

async fn not_found() -> ApplicationError {
    ApplicationError::NotFound
}

/// Wraps `router` so verb overrides are applied before any route matching.
pub fn with_method_override(router: Router, rules: VerbRules) -> Router {
    Router::new()
        .fallback_service(router)
        .layer(middleware::from_fn_with_state(
            Arc::new(rules),
            override_method,
        ))
}
