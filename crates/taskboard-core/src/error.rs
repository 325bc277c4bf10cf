//! Error types for the board engine

use std::fmt;

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Which kind of entity a lookup missed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Board,
    Column,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Board => "board",
            EntityKind::Column => "column",
            EntityKind::Task => "task",
        })
    }
}

/// Failure reported by the persistence gateway. Only a human-readable
/// message is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<String> for GatewayError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// Errors returned by store operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// Caller input failed a precondition; nothing was changed
    #[error("invalid input: {0}")]
    Validation(String),

    /// Referenced entity is not in local state; nothing was changed
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The gateway call failed
    #[error(transparent)]
    Persistence(#[from] GatewayError),
}

impl BoardError {
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        BoardError::NotFound { entity, id: id.to_string() }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, BoardError::Persistence(_))
    }
}

/// Index outside the list handed to the reorder engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<ReorderError> for BoardError {
    fn from(err: ReorderError) -> Self {
        BoardError::Validation(err.to_string())
    }
}
