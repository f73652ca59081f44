//! Error types for the turn resolver and its collaborators.

use thiserror::Error;

use crate::entity::EntityRef;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
///
/// Player misbehaviour never surfaces here: bad commands become
/// [`Move::Error`](crate::moves::Move::Error) and unresponsive agents are
/// eliminated. A `GameError` from the resolver means the world itself is
/// inconsistent and the match must stop.
#[derive(Debug, Error)]
pub enum GameError {
    /// The resolver reached a state that validated input can never produce.
    #[error("Invariant violated on turn {turn}: {message}")]
    InvariantViolation {
        /// Turn being resolved when the violation was detected.
        turn: u32,
        /// What was inconsistent.
        message: String,
    },

    /// A reference named an entity that does not exist.
    #[error("Entity not found: {0:?}")]
    InvalidEntity(EntityRef),

    /// Binary (de)serialization of a world or replay failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Reading or writing a file failed.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// File that could not be accessed.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Replay written by an incompatible engine version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Game constants or map settings were rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GameError {
    /// Shorthand for [`GameError::InvariantViolation`].
    pub fn invariant(turn: u32, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            turn,
            message: message.into(),
        }
    }
}
