use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rollcall_core::error::CoreError;
use rollcall_core::student::{FieldErrors, Submission, DUPLICATE_ROLL_NO};
use rollcall_db::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rollcall_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body was not acceptable JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] JsonRejection),

    /// The `{id}` path segment was not an integer, so no student can match.
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    /// Single-record view of a store error. Batch operations that need the
    /// per-record shape translate [`StoreError::ConstraintViolation`] themselves.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::Core(CoreError::NotFound {
                entity: "Student",
                id,
            }),
            StoreError::ConstraintViolation { .. } => {
                AppError::Core(FieldErrors::single("roll_no", DUPLICATE_ROLL_NO).into())
            }
            StoreError::Database(err) => AppError::Database(err),
        }
    }
}

impl From<Submission<FieldErrors>> for AppError {
    fn from(errors: Submission<FieldErrors>) -> Self {
        AppError::Core(CoreError::Validation(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} not found"),
                ),
                // Field errors are the whole body: `{"field": ["message", ...]}`
                // or one such map per record for batch submissions.
                CoreError::Validation(errors) => {
                    return (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response();
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InvalidJson(rejection) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                rejection.body_text(),
            ),
            AppError::InvalidPath(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Student not found".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a sqlx error to a sanitized 500.
///
/// Roll number clashes never get here: the store reports them as
/// [`StoreError::ConstraintViolation`], and lookups of missing rows come
/// back as [`StoreError::NotFound`].
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
