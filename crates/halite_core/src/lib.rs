//! # Halite Core
//!
//! Deterministic turn resolver for a continuous-space fleet strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No agent IO (replay files are the single exception)
//! - No system randomness
//! - No floating-point math in resolution (uses fixed-point)
//!
//! This separation enables:
//! - Authoritative match hosts that are easy to test
//! - Replay verification by re-resolution
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`entity`] - Ships, planets and entity references
//! - [`world`] - Map state, per-player ship tables
//! - [`moves`] - Commands and per-player command history
//! - [`collision`] - Spatial bucketing and sub-step movement history
//! - [`resolver`] - Turn resolution, damage, docking and production
//! - [`stats`] - Elimination bookkeeping and ranking
//! - [`replay`] - Recording and verified playback
//! - [`map_generation`] - Seeded starting layouts
//! - [`rules`] - Game-balance constants
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod collision;
pub mod entity;
pub mod error;
pub mod map_generation;
pub mod math;
pub mod moves;
pub mod replay;
pub mod resolver;
pub mod rules;
pub mod stats;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::entity::{
        DockingStatus, Entity, EntityRef, Location, Planet, PlanetIndex, PlayerId, Ship, ShipIndex,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::map_generation::{generate_map, MapConfig};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::moves::{CommandQueue, Move, MoveQueue, PlayerMoves, TurnMoves};
    pub use crate::replay::{Replay, ReplayPlayer};
    pub use crate::resolver::{kill_player, resolve_turn, TurnEvents, TurnOutcome};
    pub use crate::rules::GameConstants;
    pub use crate::stats::{GameStatistics, MatchStats, PlayerStatistics};
    pub use crate::world::World;
}
