//! Persistence error types.

use thiserror::Error;

/// Failures surfaced by the entity store.
///
/// Nothing in the store retries or swallows these; every variant reaches the
/// caller of the operation that produced it.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    #[error("Query execution failed: {0}")]
    Query(String),
}
