//! The record store contract.
//!
//! Handlers hold an `Arc<dyn StudentStore>` so the same request pipeline runs
//! against PostgreSQL in production and against memory in tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use rollcall_core::student::StudentCandidate;
use rollcall_core::types::DbId;

use crate::models::student::Student;

pub use memory::MemoryStudentStore;
pub use postgres::PgStudentStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Student with id {0} not found")]
    NotFound(DbId),

    /// `roll_no` is already held by another row. `index` is the position of
    /// the offending candidate within the operation (always 0 for single-row
    /// operations).
    #[error("Duplicate roll number {roll_no:?} at position {index}")]
    ConstraintViolation { roll_no: String, index: usize },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD primitives over the student table.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All rows in natural storage order.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    /// Persist one candidate, assigning its id.
    async fn insert(&self, candidate: &StudentCandidate) -> Result<Student, StoreError>;

    /// Persist all candidates or none of them.
    async fn insert_many(&self, candidates: &[StudentCandidate]) -> Result<Vec<Student>, StoreError>;

    async fn get_by_id(&self, id: DbId) -> Result<Student, StoreError>;

    /// Overwrite every field of the row with the given id.
    async fn replace(&self, id: DbId, candidate: &StudentCandidate) -> Result<Student, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_by_id(&self, id: DbId) -> Result<u64, StoreError>;

    /// Returns the number of rows removed; unknown ids are ignored.
    async fn delete_by_ids(&self, ids: &[DbId]) -> Result<u64, StoreError>;

    /// Which of `roll_nos` are held by rows other than `exclude_id`.
    async fn taken_roll_nos(
        &self,
        roll_nos: &[String],
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
