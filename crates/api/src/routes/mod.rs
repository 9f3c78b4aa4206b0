pub mod health;
pub mod todo;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST /todo      create a todo and publish todo.created
/// POST /upload    upload a file (multipart field `file`)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(todo::router())
        .merge(upload::router())
}
