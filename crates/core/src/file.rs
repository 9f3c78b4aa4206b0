//! Uploaded file entity, upload validation rules, and storage path derivation.

use serde::Serialize;

use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted upload size (10 MiB).
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

/// Accepted file extensions, lowercase and including the leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".txt", ".doc", ".docx",
];

/// Prefix under which every uploaded object is stored.
const STORAGE_PREFIX: &str = "files";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// First rule an upload candidate violates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileValidationError {
    #[error("file size exceeds maximum allowed size of {max} bytes")]
    TooLarge { max: i64 },

    #[error("file size must be greater than 0")]
    EmptyContent,

    #[error("file name cannot be empty")]
    EmptyName,

    #[error("file type {0} is not allowed")]
    ExtensionNotAllowed(String),
}

/// Check an upload candidate against the size ceiling and extension allow-list.
///
/// Reports only the first violation, in this order: size ceiling, non-positive
/// size, empty name, extension.
pub fn validate_file(file_name: &str, size: i64) -> Result<(), FileValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(FileValidationError::TooLarge { max: MAX_FILE_SIZE });
    }

    if size <= 0 {
        return Err(FileValidationError::EmptyContent);
    }

    if file_name.is_empty() {
        return Err(FileValidationError::EmptyName);
    }

    let ext = extension_of(file_name);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FileValidationError::ExtensionNotAllowed(ext));
    }

    Ok(())
}

/// Lowercased extension of the final path component, including the dot.
///
/// Returns an empty string when the name has no dot.
pub fn extension_of(file_name: &str) -> String {
    let base = base_name(file_name);
    match base.rfind('.') {
        Some(idx) => base[idx..].to_ascii_lowercase(),
        None => String::new(),
    }
}

fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
}

/// Derive the object key for a file: `files/<id>/<name>`.
///
/// Directory components in `file_name` are dropped so the key always stays
/// under the file's own prefix.
pub fn storage_path(file_id: EntityId, file_name: &str) -> String {
    format!("{STORAGE_PREFIX}/{file_id}/{}", base_name(file_name))
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An uploaded file. Only ever lives in memory; the bytes go to object storage.
#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub id: EntityId,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub storage_path: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl File {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size: i64) -> Self {
        let now = chrono::Utc::now();
        let id = uuid::Uuid::new_v4();
        let file_name = file_name.into();
        Self {
            id,
            storage_path: storage_path(id, &file_name),
            file_name,
            content_type: content_type.into(),
            size,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.file_name.is_empty() && self.size > 0 && !self.id.is_nil()
    }
}
