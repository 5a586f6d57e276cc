use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    application::error::UploadError,
    domain::models::{
        file::StoredFile,
        session::{Flash, RequestContext, SessionUser},
    },
};

pub const UPLOAD_VIEW: &str = "donations/upload";

const UPLOAD_SUCCESS_MESSAGE: &str = "File Uploaded!";
const NO_FILE_HINT: &str = "No file Selected";

/// Values every view receives from the request context.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ViewLocals {
    #[serde(rename = "loggedInUser", skip_serializing_if = "Option::is_none")]
    pub logged_in_user: Option<SessionUser>,
    #[serde(rename = "userRole", skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(rename = "sessionFlash", skip_serializing_if = "Option::is_none")]
    pub session_flash: Option<Flash>,
}

impl From<&RequestContext> for ViewLocals {
    fn from(context: &RequestContext) -> Self {
        Self {
            logged_in_user: context.user.clone(),
            user_role: context.role_name().map(str::to_string),
            session_flash: context.flash.clone(),
        }
    }
}

/// A view name plus everything it is rendered with. Template rendering
/// happens outside this service, so the response body is the view model
/// itself as JSON.
#[derive(Debug, Serialize)]
pub struct ViewResponse<T> {
    pub view: &'static str,
    #[serde(flatten)]
    pub locals: ViewLocals,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ViewResponse<T> {
    pub fn new(view: &'static str, context: &RequestContext, data: T) -> Self {
        Self {
            view,
            locals: ViewLocals::from(context),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ViewResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct UploadView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mul: Option<String>,
}

impl UploadView {
    pub fn uploaded(stored: &StoredFile) -> Self {
        Self {
            msg: Some(UPLOAD_SUCCESS_MESSAGE.to_string()),
            file: Some(stored.public_path.clone()),
            mul: Some(NO_FILE_HINT.to_string()),
        }
    }

    pub fn failed(error: &UploadError) -> Self {
        Self {
            msg: Some(error.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_uploaded_view() {
        let stored = StoredFile {
            generated_file_name: "myImage-1.jpg".to_string(),
            storage_path: PathBuf::from("public/uploads/myImage-1.jpg"),
            public_path: "/public/uploads/myImage-1.jpg".to_string(),
            size_bytes: 500,
        };

        let view = UploadView::uploaded(&stored);

        assert_eq!(view.msg.as_deref(), Some("File Uploaded!"));
        assert_eq!(view.file.as_deref(), Some("/public/uploads/myImage-1.jpg"));
        assert_eq!(view.mul.as_deref(), Some("No file Selected"));
    }

    #[test]
    fn test_failed_view_carries_only_message() {
        let view = UploadView::failed(&UploadError::InvalidFileType);
        assert_eq!(
            view,
            UploadView {
                msg: Some("Error: Images Only!".to_string()),
                file: None,
                mul: None,
            }
        );
    }

    #[test]
    fn test_view_response_merges_locals() {
        let context = RequestContext {
            user: Some(SessionUser {
                id: "7".to_string(),
                username: Some("sam".to_string()),
                role_name: "admin".to_string(),
            }),
            flash: Some(Flash::new("info", "Welcome back")),
        };

        let response = ViewResponse::new(
            UPLOAD_VIEW,
            &context,
            UploadView::failed(&UploadError::NoFileSelected),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["view"], "donations/upload");
        assert_eq!(value["msg"], "Error: No file selected");
        assert_eq!(value["userRole"], "admin");
        assert_eq!(value["loggedInUser"]["username"], "sam");
        assert_eq!(value["sessionFlash"]["message"], "Welcome back");
        assert!(value.get("file").is_none());
    }

    #[test]
    fn test_anonymous_view_has_no_locals() {
        let response = ViewResponse::new(
            UPLOAD_VIEW,
            &RequestContext::anonymous(),
            UploadView::default(),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, serde_json::json!({ "view": "donations/upload" }));
    }
}
