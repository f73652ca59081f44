//! Error types for agent communication and match hosting.

use std::time::Duration;

use halite_core::error::GameError;
use thiserror::Error;

/// Failure of a single agent exchange.
///
/// Never aborts a match: the player is eliminated (or, with timeouts
/// ignored, plays the turn without commands).
#[derive(Debug, Error)]
pub enum AgentError {
    /// No reply within the deadline.
    #[error("No reply within {0:?}")]
    Timeout(Duration),

    /// The reply did not follow the agent protocol.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The agent closed its output.
    #[error("Agent disconnected")]
    Disconnected,

    /// Reading from or writing to the agent failed.
    #[error("Agent IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Match-level failure.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The resolver or replay recorder failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// An agent could not be started.
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Server settings were rejected.
    #[error("Invalid server configuration: {0}")]
    Config(String),

    /// The match result could not be encoded.
    #[error("Failed to encode result: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type alias using [`ServerError`].
pub type Result<T> = std::result::Result<T, ServerError>;
