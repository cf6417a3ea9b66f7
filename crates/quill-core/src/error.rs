//! Domain-level error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ports::AuthError;

/// A single failed write-boundary rule, tagged with the wire name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },

    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Referenced by other entities: {0}")]
    Referential(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("No persister supports resource kind '{0}'")]
    Unsupported(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for a validation error on a single field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation(msg) => DomainError::Duplicate(msg),
            RepoError::ForeignKeyViolation(msg) => DomainError::Referential(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
            // Callers that know the id map NotFound themselves.
            RepoError::NotFound => DomainError::Internal("entity vanished during write".to_string()),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => DomainError::Forbidden,
            AuthError::HashingError(msg) => DomainError::Internal(msg),
            _ => DomainError::Unauthorized,
        }
    }
}
