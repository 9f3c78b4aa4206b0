//! Handlers for the `/todo` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use todo_core::todo::{CreateTodoRequest, TodoItem};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/todo
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<TodoItem>>)> {
    let Json(input) =
        payload.map_err(|e| AppError::bad_request("Invalid request body", e.body_text()))?;

    let todo = state
        .todos
        .create_todo(input, &state.deadline())
        .await
        .map_err(|e| AppError::core("Failed to create todo", e))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Todo created successfully",
            data: todo,
        }),
    ))
}
