//! Error taxonomy surfaced by the query layer and ingestion pipeline.
//! The server maps each variant to a distinct HTTP status. Validator
//! faults are not errors at this level; they travel as a gate decision.

use thiserror::Error;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad or missing caller input (HTTP 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// No matching taxonomy or image row (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying query or exec failure (HTTP 500).
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Failures outside the other categories, e.g. a poisoned blocking
    /// task during ingestion (HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
