//! Shared response envelope types for API handlers.
//!
//! Successful writes answer with `{ "message": ..., "data": ... }`.

use serde::Serialize;

/// Standard `{ "message": ..., "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}
