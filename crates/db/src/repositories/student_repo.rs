//! Repository for the `students` table.

use rollcall_core::student::StudentCandidate;
use rollcall_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::student::Student;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, roll_no, name, age, city";

/// Name of the unique constraint guarding `roll_no`.
pub const ROLL_NO_CONSTRAINT: &str = "uq_students_roll_no";

/// Provides CRUD operations for students.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a new student, returning the created row.
    ///
    /// Accepts any executor so bulk inserts can run inside a transaction.
    pub async fn create<'e, E>(executor: E, input: &StudentCandidate) -> Result<Student, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO students (roll_no, name, age, city)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(&input.roll_no)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.city)
            .fetch_one(executor)
            .await
    }

    /// Find a student by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all students in insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students ORDER BY id");
        sqlx::query_as::<_, Student>(&query).fetch_all(pool).await
    }

    /// Overwrite every field of a student.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &StudentCandidate,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!(
            "UPDATE students SET
                roll_no = $2,
                name = $3,
                age = $4,
                city = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(&input.roll_no)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.city)
            .fetch_optional(pool)
            .await
    }

    /// Delete a student by ID. Returns the number of rows removed (0 or 1).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every student whose ID is in `ids`. Unknown IDs are ignored.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Return the subset of `roll_nos` already held by a row other than
    /// `exclude_id`.
    pub async fn find_taken_roll_nos(
        pool: &PgPool,
        roll_nos: &[String],
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT roll_no FROM students
             WHERE roll_no = ANY($1) AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(roll_nos)
        .bind(exclude_id)
        .fetch_all(pool)
        .await
    }
}

/// Whether `err` is a violation of the `roll_no` unique constraint.
pub fn is_roll_no_violation(err: &sqlx::Error) -> bool {
    match err {
        // PostgreSQL unique constraint violation: error code 23505
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(ROLL_NO_CONSTRAINT)
        }
        _ => false,
    }
}
