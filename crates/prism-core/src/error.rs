//! Error types for PRISM

use thiserror::Error;

use crate::{AttributeKind, EntityIndex};

/// Core PRISM errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrismError {
    // Boundary errors
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Identifier too short: expected at least {expected} bytes, got {actual}")]
    IdentifierTooShort { expected: usize, actual: usize },

    // Collaborator contract errors
    #[error("Entity index {0} has no identifier")]
    UnresolvedEntity(EntityIndex),

    #[error("Unknown render node: {0}")]
    UnknownNode(u32),

    // Channel errors
    #[error("{0} update stream closed")]
    StreamClosed(AttributeKind),

    #[error("Command rejected: {0}")]
    CommandRejected(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for PRISM operations
pub type PrismResult<T> = Result<T, PrismError>;

impl From<hex::FromHexError> for PrismError {
    fn from(err: hex::FromHexError) -> Self {
        PrismError::InvalidHex(err.to_string())
    }
}
