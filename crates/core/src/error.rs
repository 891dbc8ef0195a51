use validator::ValidationErrors;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more request fields failed validation. Carries every
    /// field-level failure, keyed by field name.
    #[error("Validation failed: {0}")]
    InvalidFields(#[from] ValidationErrors),
}
