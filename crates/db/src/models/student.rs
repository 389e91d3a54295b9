//! Student entity model and DTOs.

use rollcall_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `students` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: DbId,
    pub roll_no: String,
    pub name: String,
    pub age: i32,
    pub city: String,
}

/// Request body for `POST /students/bulk/delete/`.
///
/// `ids` may be absent or `null`; the handler treats that like an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Option<Vec<DbId>>,
}

impl BulkDeleteRequest {
    /// The requested ids, empty when none were sent.
    pub fn into_ids(self) -> Vec<DbId> {
        self.ids.unwrap_or_default()
    }
}
