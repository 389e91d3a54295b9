use std::collections::BTreeMap;

use async_trait::async_trait;
use rollcall_core::student::StudentCandidate;
use rollcall_core::types::DbId;
use tokio::sync::RwLock;

use super::{StoreError, StudentStore};
use crate::models::student::Student;

/// In-process [`StudentStore`] with the same uniqueness and id rules as the
/// `students` table. Used by the HTTP test suite.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<DbId, Student>,
    /// Last id handed out. Ids are never reused, mirroring BIGSERIAL.
    last_id: DbId,
}

impl Inner {
    fn holder_of(&self, roll_no: &str) -> Option<DbId> {
        self.rows
            .values()
            .find(|s| s.roll_no == roll_no)
            .map(|s| s.id)
    }

    fn push(&mut self, candidate: &StudentCandidate) -> Student {
        self.last_id += 1;
        let student = Student {
            id: self.last_id,
            roll_no: candidate.roll_no.clone(),
            name: candidate.name.clone(),
            age: candidate.age,
            city: candidate.city.clone(),
        };
        self.rows.insert(student.id, student.clone());
        student
    }
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn insert(&self, candidate: &StudentCandidate) -> Result<Student, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.holder_of(&candidate.roll_no).is_some() {
            return Err(StoreError::ConstraintViolation {
                roll_no: candidate.roll_no.clone(),
                index: 0,
            });
        }
        Ok(inner.push(candidate))
    }

    async fn insert_many(&self, candidates: &[StudentCandidate]) -> Result<Vec<Student>, StoreError> {
        let mut inner = self.inner.write().await;

        // Check the whole batch, including against itself, before writing.
        for (index, candidate) in candidates.iter().enumerate() {
            let repeated = candidates[..index]
                .iter()
                .any(|earlier| earlier.roll_no == candidate.roll_no);
            if repeated || inner.holder_of(&candidate.roll_no).is_some() {
                return Err(StoreError::ConstraintViolation {
                    roll_no: candidate.roll_no.clone(),
                    index,
                });
            }
        }

        Ok(candidates.iter().map(|c| inner.push(c)).collect())
    }

    async fn get_by_id(&self, id: DbId) -> Result<Student, StoreError> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn replace(&self, id: DbId, candidate: &StudentCandidate) -> Result<Student, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if matches!(inner.holder_of(&candidate.roll_no), Some(holder) if holder != id) {
            return Err(StoreError::ConstraintViolation {
                roll_no: candidate.roll_no.clone(),
                index: 0,
            });
        }

        let student = Student {
            id,
            roll_no: candidate.roll_no.clone(),
            name: candidate.name.clone(),
            age: candidate.age,
            city: candidate.city.clone(),
        };
        inner.rows.insert(id, student.clone());
        Ok(student)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<u64, StoreError> {
        let removed = self.inner.write().await.rows.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_by_ids(&self, ids: &[DbId]) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut removed = 0;
        for id in ids {
            if inner.rows.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn taken_roll_nos(
        &self,
        roll_nos: &[String],
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|s| Some(s.id) != exclude_id && roll_nos.contains(&s.roll_no))
            .map(|s| s.roll_no.clone())
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
