use thiserror::Error;

use crate::domain::validator::ValidationError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Unknown entity '{slug}'")]
    UnknownEntity { slug: String },

    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Constraint violation: {message}")]
    Constraint { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unknown_entity(slug: impl Into<String>) -> Self {
        Self::UnknownEntity { slug: slug.into() }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<ValidationError> for DomainError {
    fn from(e: ValidationError) -> Self {
        Self::Validation {
            field: e.field,
            reason: e.reason,
        }
    }
}
