use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Extension,
};
use tracing::{info, warn};

use crate::{
    adapters::dto::view_dto::{UploadView, ViewResponse, UPLOAD_VIEW},
    application::{
        error::UploadError,
        services::{UploadPolicy, UploadService},
    },
    domain::models::{file::UploadRequest, session::RequestContext},
};

/// Declared type assumed for file parts that come without one.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct UploadController;

impl UploadController {
    /// GET /donations/upload
    pub async fn show_upload_form(
        Extension(context): Extension<RequestContext>,
    ) -> ViewResponse<UploadView> {
        ViewResponse::new(UPLOAD_VIEW, &context, UploadView::default())
    }

    /// POST /donations/upload
    ///
    /// Upload failures are rendered into the view as a message, never
    /// returned as an HTTP error.
    pub async fn upload_image(
        State(upload_service): State<Arc<UploadService>>,
        Extension(context): Extension<RequestContext>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> ViewResponse<UploadView> {
        let outcome = match multipart {
            Ok(multipart) => match Self::read_upload(upload_service.policy(), multipart).await {
                Ok(request) => upload_service.process(request).await,
                Err(e) => Err(e),
            },
            // Not a multipart body at all, so there is no file in it
            Err(rejection) => {
                warn!("Upload without a multipart body: {}", rejection.body_text());
                Err(UploadError::NoFileSelected)
            }
        };

        let view = match outcome {
            Ok(stored) => {
                info!("Image uploaded to {}", stored.public_path);
                UploadView::uploaded(&stored)
            }
            Err(e) => {
                warn!("Image upload failed: {:?}", e);
                UploadView::failed(&e)
            }
        };

        ViewResponse::new(UPLOAD_VIEW, &context, view)
    }

    /// Pulls the single allowed file part out of the body. The type is
    /// checked as soon as the part header is seen and the size while it
    /// streams, so a rejected file is never buffered in full.
    async fn read_upload(
        policy: &UploadPolicy,
        mut multipart: Multipart,
    ) -> Result<Option<UploadRequest>, UploadError> {
        let mut upload: Option<UploadRequest> = None;

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            // Plain form fields are not part of the upload
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            // What browsers send for an empty file input
            if file_name.is_empty() {
                continue;
            }

            let field_name = field.name().unwrap_or_default().to_string();
            policy.check_field(&field_name)?;
            if upload.is_some() {
                warn!("More than one file submitted under '{}'", field_name);
                return Err(UploadError::UnexpectedField(field_name));
            }

            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string();
            policy.check_type(&file_name, &mime_type)?;

            let mut content = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                content.extend_from_slice(&chunk);
                policy.check_size(content.len() as u64)?;
            }

            upload = Some(UploadRequest::new(field_name, file_name, mime_type, content));
        }

        Ok(upload)
    }
}

fn multipart_error(error: MultipartError) -> UploadError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge
    } else {
        warn!("Invalid multipart data: {}", error.body_text());
        UploadError::MalformedRequest
    }
}
