//! File-upload workflow: validate, build the entity, write the bytes.
//!
//! No relational interaction. The returned file id is associated with a todo
//! by a later, separate create request.

use std::sync::Arc;

use serde::Serialize;

use crate::deadline::Deadline;
use crate::error::CoreError;
use crate::file::{validate_file, File};
use crate::ports::FileStorage;

/// Input for [`FileUseCase::upload_file`].
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadFileResponse {
    pub file_id: String,
}

pub struct FileUseCase {
    storage: Arc<dyn FileStorage>,
}

impl FileUseCase {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Validate and store an uploaded file under `files/<id>/<name>`.
    ///
    /// If the storage write fails, the in-memory [`File`] is simply dropped;
    /// nothing else has seen its id.
    pub async fn upload_file(
        &self,
        req: UploadFileRequest,
        deadline: &Deadline,
    ) -> Result<UploadFileResponse, CoreError> {
        validate_file(&req.file_name, req.size)?;

        let file = File::new(req.file_name, req.content_type, req.size);

        if !file.is_valid() {
            return Err(CoreError::Validation("invalid file data".to_string()));
        }

        deadline
            .run(
                "upload file",
                self.storage.upload_file(
                    &file.storage_path,
                    &file.content_type,
                    req.data,
                    file.size,
                ),
            )
            .await
            .map_err(|err| {
                tracing::error!(
                    file_id = %file.id,
                    storage_path = %file.storage_path,
                    error = %err,
                    "File upload failed"
                );
                CoreError::workflow("failed to upload file to storage", err)
            })?;

        tracing::info!(
            file_id = %file.id,
            storage_path = %file.storage_path,
            size = file.size,
            "File uploaded"
        );

        Ok(UploadFileResponse {
            file_id: file.id.to_string(),
        })
    }
}
