pub mod health;
pub mod student;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /students/                  list
/// /students/bulk/             create one or many (POST)
/// /students/bulk/delete/      delete many (POST)
/// /students/{id}/             get, replace, delete
/// /students/{id}/delete/      delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(student::router())
}
