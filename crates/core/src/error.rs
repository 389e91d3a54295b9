use crate::student::{FieldErrors, Submission};
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Field-level failures, shaped like the submission that produced them.
    #[error("Validation failed: {0}")]
    Validation(Submission<FieldErrors>),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::Validation(Submission::Single(errors))
    }
}

impl From<Submission<FieldErrors>> for CoreError {
    fn from(errors: Submission<FieldErrors>) -> Self {
        CoreError::Validation(errors)
    }
}
