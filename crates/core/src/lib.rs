//! Domain types shared by the store and the HTTP layer.
//!
//! Nothing in this crate touches the database or the network: it owns the
//! student validation rules and the domain error taxonomy.

pub mod error;
pub mod student;
pub mod types;
