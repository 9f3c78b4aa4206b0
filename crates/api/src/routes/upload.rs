//! Route definitions for `/upload`.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use todo_core::file::MAX_FILE_SIZE;

use crate::handlers::upload;
use crate::state::AppState;

/// Headroom above [`MAX_FILE_SIZE`] for multipart framing. Bodies within the
/// limit reach file validation; larger ones are cut off while the field is
/// read and reported with the same size validation message.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Request body ceiling for the upload route.
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE as usize + MULTIPART_OVERHEAD;

/// Routes mounted at `/upload`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
