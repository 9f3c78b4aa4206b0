use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use todo_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Every variant carries a short `summary` shown as `error` in the JSON body;
/// the full cause chain goes into `details`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request could not be decoded (malformed JSON, missing multipart field).
    #[error("{summary}: {details}")]
    BadRequest {
        summary: &'static str,
        details: String,
    },

    /// A workflow failure. Validation maps to 400, everything else to 500.
    #[error("{summary}: {source}")]
    Core {
        summary: &'static str,
        #[source]
        source: CoreError,
    },

    /// A workflow failure reported as 400 regardless of cause.
    #[error("{summary}: {source}")]
    Rejected {
        summary: &'static str,
        #[source]
        source: CoreError,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(summary: &'static str, details: impl Into<String>) -> Self {
        Self::BadRequest {
            summary,
            details: details.into(),
        }
    }

    pub fn core(summary: &'static str, source: CoreError) -> Self {
        Self::Core { summary, source }
    }

    pub fn rejected(summary: &'static str, source: CoreError) -> Self {
        Self::Rejected { summary, source }
    }
}

/// Machine-readable code for a workflow failure.
fn core_code(err: &CoreError) -> &'static str {
    match err.root() {
        CoreError::Validation(_) => "VALIDATION_ERROR",
        CoreError::Timeout { .. } => "TIMEOUT",
        CoreError::Cancelled { .. } => "CANCELLED",
        _ => "INTERNAL_ERROR",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, summary, details) = match &self {
            AppError::BadRequest { summary, details } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", *summary, details.clone())
            }
            AppError::Core { summary, source } => {
                let status = if source.is_validation() {
                    StatusCode::BAD_REQUEST
                } else {
                    tracing::error!(error = %source, "{summary}");
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, core_code(source), *summary, source.to_string())
            }
            AppError::Rejected { summary, source } => {
                let code = match source.root() {
                    CoreError::Storage(_) | CoreError::Publish(_) => "UPLOAD_FAILED",
                    _ => core_code(source),
                };
                (StatusCode::BAD_REQUEST, code, *summary, source.to_string())
            }
        };

        let body = json!({
            "error": summary,
            "code": code,
            "details": details,
        });

        (status, axum::Json(body)).into_response()
    }
}
