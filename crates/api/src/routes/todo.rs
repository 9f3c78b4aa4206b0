use axum::routing::post;
use axum::Router;

use crate::handlers::todo;
use crate::state::AppState;

/// Routes mounted at `/todo`.
pub fn router() -> Router<AppState> {
    Router::new().route("/todo", post(todo::create))
}
