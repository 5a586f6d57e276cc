use std::path::{Path, PathBuf};

use serde::Serialize;

/// Form field the upload form submits its image under.
pub const IMAGE_FIELD: &str = "myImage";

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 1_000_000;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

/// A single file part pulled out of a multipart body. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub field_name: String,
    pub original_file_name: String,
    pub declared_mime_type: String,
    pub content: Vec<u8>,
}

impl UploadRequest {
    pub fn new(
        field_name: String,
        original_file_name: String,
        declared_mime_type: String,
        content: Vec<u8>,
    ) -> Self {
        Self {
            field_name,
            original_file_name,
            declared_mime_type,
            content,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn extension(&self) -> Option<&str> {
        file_extension(&self.original_file_name)
    }
}

/// A file written to the upload directory. Never mutated once created.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "generatedFileName")]
    pub generated_file_name: String,
    #[serde(rename = "storagePath")]
    pub storage_path: PathBuf,
    /// URL path the file is served back under, e.g. `/public/uploads/myImage-1.png`
    #[serde(rename = "publicPath")]
    pub public_path: String,
    #[serde(rename = "sizeBytes")]
    pub size_bytes: u64,
}

/// Extension of `file_name` without the leading dot. Dotfiles such as
/// `.png` have no extension.
pub fn file_extension(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|ext| ext.to_str())
}

/// Checks an extension and a declared MIME type against the image allow-list.
///
/// Both checks run independently and both must pass. Neither looks at the
/// file's bytes, so a renamed file with a matching declared type passes.
pub fn is_allowed_image(extension: &str, mime_type: &str) -> bool {
    extension_allowed(extension) && mime_type_allowed(mime_type)
}

fn extension_allowed(extension: &str) -> bool {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&extension.as_str())
}

fn mime_type_allowed(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((_, subtype)) => {
            ALLOWED_IMAGE_TYPES.contains(&subtype.to_ascii_lowercase().as_str())
        }
        None => false,
    }
}

/// Builds `<field>-<unix millis><.ext>`, keeping the original extension as
/// written. Uniqueness only holds down to millisecond granularity.
pub fn generate_file_name(field_name: &str, unix_millis: i64, original_file_name: &str) -> String {
    let extension = file_extension(original_file_name)
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!("{}-{}{}", field_name, unix_millis, extension)
}
