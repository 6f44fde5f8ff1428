//! Custom error types for Stride
//!
//! This module defines the error hierarchy for the goal engine using thiserror
//! for ergonomic error definitions. Every failure is scoped to the single
//! operation that raised it; nothing here is fatal to the process.

use thiserror::Error;

/// The main error type for Stride operations
#[derive(Error, Debug)]
pub enum StrideError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Malformed input on create/update
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity does not exist or is not owned by the requesting user
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A milestone index that does not point at a current element
    #[error("Milestone index {index} out of range (goal has {len} milestones)")]
    OutOfRange { index: usize, len: usize },

    /// Operation invoked on an aggregate that is not in a state to support it
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StrideError {
    /// Create a "not found" error for goals
    pub fn goal_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Goal",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transaction records
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a milestone index error
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<std::io::Error> for StrideError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StrideError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Stride operations
pub type StrideResult<T> = Result<T, StrideError>;
