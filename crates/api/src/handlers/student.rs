//! Handlers for the `/students` resource.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::student::{validate_record, StudentCandidate, Submission, DEFAULT_ROLL_NO};
use rollcall_core::types::DbId;
use rollcall_db::models::student::{BulkDeleteRequest, Student};
use rollcall_db::store::{StoreError, StudentStore};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::{DataMessageResponse, MessageResponse};
use crate::state::AppState;

/// Reject `candidates` if any roll number is held by a row other than
/// `exclude_id`. The table constraint still backstops concurrent writers.
async fn ensure_roll_nos_free(
    store: &dyn StudentStore,
    candidates: &Submission<StudentCandidate>,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if candidates.is_empty() {
        return Ok(());
    }
    let taken = store
        .taken_roll_nos(&candidates.roll_nos(), exclude_id)
        .await?;
    candidates.reject_taken(&taken)?;
    Ok(())
}

/// GET /api/students/
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Student>>> {
    let students = state.store.list().await?;
    Ok(Json(students))
}

/// GET /api/students/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Student>> {
    let Path(id) = path?;
    let student = state.store.get_by_id(id).await?;
    Ok(Json(student))
}

/// POST /api/students/bulk/
///
/// Accepts one object or an array of objects. Either every record is
/// created or none is; `data` mirrors the shape of the request body.
pub async fn bulk_create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataMessageResponse<Submission<Student>>>)> {
    let Json(body) = payload?;

    let candidates = Submission::from_json(body).validate(DEFAULT_ROLL_NO)?;
    ensure_roll_nos_free(state.store.as_ref(), &candidates, None).await?;

    let created = match &candidates {
        Submission::Single(candidate) => Submission::Single(state.store.insert(candidate).await?),
        Submission::Batch(batch) => match state.store.insert_many(batch).await {
            Ok(students) => Submission::Batch(students),
            Err(StoreError::ConstraintViolation { index, .. }) => {
                return Err(candidates.conflict_at(index).into());
            }
            Err(err) => return Err(err.into()),
        },
    };

    tracing::info!(count = created.len(), batch = created.is_batch(), "Students added");

    Ok((
        StatusCode::CREATED,
        Json(DataMessageResponse::new("Students added", created)),
    ))
}

/// PUT /api/students/{id}/
///
/// Full replacement. An omitted `roll_no` keeps the stored one.
pub async fn replace(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<DataMessageResponse<Student>>> {
    let Path(id) = path?;
    let Json(body) = payload?;

    // Unknown ids answer 404 before the body is looked at.
    let existing = state.store.get_by_id(id).await?;

    let candidate = validate_record(&body, &existing.roll_no).map_err(CoreError::from)?;
    ensure_roll_nos_free(
        state.store.as_ref(),
        &Submission::Single(candidate.clone()),
        Some(id),
    )
    .await?;

    let student = state.store.replace(id, &candidate).await?;

    tracing::info!(student_id = id, "Student updated");

    Ok(Json(DataMessageResponse::new("Student updated", student)))
}

/// DELETE /api/students/{id}/
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let deleted = state.store.delete_by_id(id).await?;
    if deleted == 0 {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id,
        }));
    }

    tracing::info!(student_id = id, "Student deleted");

    Ok(Json(MessageResponse::new("Student deleted")))
}

/// Read the bulk delete body. No body, a non-JSON body and a JSON `null`
/// all mean no ids were sent.
fn requested_ids(headers: &HeaderMap, body: &Bytes) -> AppResult<Vec<DbId>> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let Json(input) = Json::<Option<BulkDeleteRequest>>::from_bytes(body)?;
    Ok(input.unwrap_or_default().into_ids())
}

/// POST /api/students/bulk/delete/
///
/// Ids that do not exist are skipped; the message reports how many rows
/// were actually removed.
pub async fn bulk_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let ids = requested_ids(&headers, &body)?;
    if ids.is_empty() {
        return Err(AppError::BadRequest("No IDs provided".into()));
    }

    let deleted = state.store.delete_by_ids(&ids).await?;

    tracing::info!(requested = ids.len(), deleted, "Students bulk deleted");

    Ok(Json(MessageResponse::new(format!("{deleted} students deleted"))))
}
