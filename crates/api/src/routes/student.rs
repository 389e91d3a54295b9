//! Route definitions for the `/students` resource.
//!
//! Paths keep their trailing slash; that is the form existing clients call.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::student;
use crate::state::AppState;

/// Routes mounted under `/api`.
///
/// ```text
/// GET    /students/                 -> list
/// POST   /students/bulk/            -> bulk_create
/// POST   /students/bulk/delete/     -> bulk_delete
/// GET    /students/{id}/            -> get_by_id
/// PUT    /students/{id}/            -> replace
/// DELETE /students/{id}/            -> delete
/// DELETE /students/{id}/delete/     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students/", get(student::list))
        .route("/students/bulk/", post(student::bulk_create))
        .route("/students/bulk/delete/", post(student::bulk_delete))
        .route(
            "/students/{id}/",
            get(student::get_by_id)
                .put(student::replace)
                .delete(student::delete),
        )
        .route("/students/{id}/delete/", delete(student::delete))
}
