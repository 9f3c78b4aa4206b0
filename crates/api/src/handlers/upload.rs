//! Handlers for the `/upload` resource.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use todo_core::error::CoreError;
use todo_core::file::{FileValidationError, MAX_FILE_SIZE};
use todo_core::usecases::{UploadFileRequest, UploadFileResponse};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

const MISSING_FILE: &str = "Failed to get file from request";
const UPLOAD_FAILED: &str = "Failed to upload file";

/// A body cut off by the route's size limit is reported as an oversize file.
fn read_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let too_large = FileValidationError::TooLarge { max: MAX_FILE_SIZE };
        return AppError::rejected(UPLOAD_FAILED, CoreError::from(too_large));
    }
    AppError::bad_request(MISSING_FILE, e.body_text())
}

/// POST /api/v1/upload
///
/// Reads the first `file` field of a multipart form; other fields are ignored.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<UploadFileResponse>>)> {
    let mut multipart = multipart.map_err(|e| AppError::bad_request(MISSING_FILE, e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(read_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(read_error)?;

        upload = Some(UploadFileRequest {
            file_name,
            content_type,
            size: data.len() as i64,
            data: data.to_vec(),
        });
        break;
    }

    let request = upload.ok_or_else(|| {
        AppError::bad_request(MISSING_FILE, format!("missing multipart field `{FILE_FIELD}`"))
    })?;

    let response = state
        .files
        .upload_file(request, &state.deadline())
        .await
        .map_err(|e| AppError::rejected(UPLOAD_FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "File uploaded successfully",
            data: response,
        }),
    ))
}
