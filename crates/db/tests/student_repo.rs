//! Integration tests for the PostgreSQL student store.
//!
//! These need a PostgreSQL server reachable through `DATABASE_URL`; run them
//! with `cargo test -p rollcall-db -- --ignored`.

use assert_matches::assert_matches;
use rollcall_core::student::StudentCandidate;
use rollcall_db::repositories::StudentRepo;
use rollcall_db::store::{PgStudentStore, StoreError, StudentStore};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_student(roll_no: &str, name: &str) -> StudentCandidate {
    StudentCandidate {
        roll_no: roll_no.to_string(),
        name: name.to_string(),
        age: 20,
        city: "NYC".to_string(),
    }
}

async fn count(pool: &PgPool) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
        .unwrap();
    n
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_roll_no_defaults_at_column_level(pool: PgPool) {
    let roll_no: String = sqlx::query_scalar(
        "INSERT INTO students (name, age, city) VALUES ('Ann', 20, 'NYC') RETURNING roll_no",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(roll_no, "0000");
}

// ---------------------------------------------------------------------------
// Store semantics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_then_get(pool: PgPool) {
    let store = PgStudentStore::new(pool);
    let input = new_student("R1", "Ann");

    let created = store.insert(&input).await.unwrap();
    let fetched = store.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched.roll_no, input.roll_no);
    assert_eq!(fetched.name, input.name);
    assert_eq!(fetched.age, input.age);
    assert_eq!(fetched.city, input.city);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_roll_no_is_constraint_violation(pool: PgPool) {
    let store = PgStudentStore::new(pool.clone());
    store.insert(&new_student("R1", "Ann")).await.unwrap();

    let err = store.insert(&new_student("R1", "Bo")).await.unwrap_err();
    assert_matches!(err, StoreError::ConstraintViolation { index: 0, .. });
    assert_eq!(count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_many_rolls_back_on_violation(pool: PgPool) {
    let store = PgStudentStore::new(pool.clone());
    store.insert(&new_student("TAKEN", "Ann")).await.unwrap();

    let batch = [
        new_student("A", "Bo"),
        new_student("B", "Cy"),
        new_student("TAKEN", "Di"),
    ];
    let err = store.insert_many(&batch).await.unwrap_err();

    assert_matches!(err, StoreError::ConstraintViolation { index: 2, .. });
    assert_eq!(count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_replace_and_not_found(pool: PgPool) {
    let store = PgStudentStore::new(pool);
    let created = store.insert(&new_student("R1", "Ann")).await.unwrap();

    let updated = store
        .replace(created.id, &new_student("R9", "Annie"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.roll_no, "R9");

    assert_matches!(
        store.replace(created.id + 1000, &new_student("R2", "X")).await,
        Err(StoreError::NotFound(_))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_by_ids_counts_only_existing(pool: PgPool) {
    let store = PgStudentStore::new(pool.clone());
    let a = store.insert(&new_student("A", "Ann")).await.unwrap();
    let b = store.insert(&new_student("B", "Bo")).await.unwrap();

    let removed = store.delete_by_ids(&[a.id, b.id, 999_999]).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(count(&pool).await, 0);
    assert_eq!(store.delete_by_id(a.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_ids_not_reused(pool: PgPool) {
    let store = PgStudentStore::new(pool);
    let first = store.insert(&new_student("A", "Ann")).await.unwrap();
    store.delete_by_id(first.id).await.unwrap();
    let second = store.insert(&new_student("A", "Ann")).await.unwrap();
    assert!(second.id > first.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_taken_roll_nos_excludes_self(pool: PgPool) {
    let ann = StudentRepo::create(&pool, &new_student("A", "Ann")).await.unwrap();
    StudentRepo::create(&pool, &new_student("B", "Bo")).await.unwrap();

    let wanted = vec!["A".to_string(), "B".to_string()];
    let taken = StudentRepo::find_taken_roll_nos(&pool, &wanted, Some(ann.id))
        .await
        .unwrap();
    assert_eq!(taken, vec!["B".to_string()]);
}
