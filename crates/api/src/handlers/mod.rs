//! Request handlers.
//!
//! Handlers parse the request, run validation from `rollcall_core`, call the
//! [`StudentStore`](rollcall_db::store::StudentStore) held in `AppState`, and
//! map failures via [`AppError`](crate::error::AppError).

pub mod student;
