//! Shared response envelope types for API handlers.
//!
//! Mutating endpoints answer with a human-readable `message`, plus the
//! affected records under `data` when there are any.

use serde::Serialize;

/// `{ "message": "..." }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{ "message": "...", "data": T }`
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataMessageResponse::new("Student updated", student)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataMessageResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> DataMessageResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
