//! # Halite Match Host
//!
//! Runs a match between agent programs: the init handshake, concurrent
//! deadline-bounded command collection, turn resolution through
//! [`halite_core`], elimination bookkeeping and replay recording.
//!
//! All game rules live in `halite_core`; this crate only moves text between
//! agents and the resolver and decides who is still playing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod ingestion;
pub mod protocol;

pub use agent::{Agent, ProcessAgent, Reply, ScriptedAgent};
pub use config::ServerConfig;
pub use error::{AgentError, ServerError};
pub use game::Match;
