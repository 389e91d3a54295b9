use async_trait::async_trait;
use rollcall_core::student::StudentCandidate;
use rollcall_core::types::DbId;

use super::{StoreError, StudentStore};
use crate::models::student::Student;
use crate::repositories::student_repo::is_roll_no_violation;
use crate::repositories::StudentRepo;
use crate::DbPool;

/// [`StudentStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStudentStore {
    pool: DbPool,
}

impl PgStudentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a write failure, attributing unique violations to the
/// candidate at `index`.
fn write_error(err: sqlx::Error, candidate: &StudentCandidate, index: usize) -> StoreError {
    if is_roll_no_violation(&err) {
        StoreError::ConstraintViolation {
            roll_no: candidate.roll_no.clone(),
            index,
        }
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(StudentRepo::list(&self.pool).await?)
    }

    async fn insert(&self, candidate: &StudentCandidate) -> Result<Student, StoreError> {
        StudentRepo::create(&self.pool, candidate)
            .await
            .map_err(|e| write_error(e, candidate, 0))
    }

    async fn insert_many(&self, candidates: &[StudentCandidate]) -> Result<Vec<Student>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            // Returning early drops `tx`, which rolls the whole batch back.
            let student = StudentRepo::create(&mut *tx, candidate)
                .await
                .map_err(|e| write_error(e, candidate, index))?;
            created.push(student);
        }

        tx.commit().await?;
        tracing::debug!(count = created.len(), "Inserted student batch");
        Ok(created)
    }

    async fn get_by_id(&self, id: DbId) -> Result<Student, StoreError> {
        StudentRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn replace(&self, id: DbId, candidate: &StudentCandidate) -> Result<Student, StoreError> {
        StudentRepo::update(&self.pool, id, candidate)
            .await
            .map_err(|e| write_error(e, candidate, 0))?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete_by_id(&self, id: DbId) -> Result<u64, StoreError> {
        Ok(StudentRepo::delete(&self.pool, id).await?)
    }

    async fn delete_by_ids(&self, ids: &[DbId]) -> Result<u64, StoreError> {
        Ok(StudentRepo::delete_many(&self.pool, ids).await?)
    }

    async fn taken_roll_nos(
        &self,
        roll_nos: &[String],
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, StoreError> {
        Ok(StudentRepo::find_taken_roll_nos(&self.pool, roll_nos, exclude_id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
