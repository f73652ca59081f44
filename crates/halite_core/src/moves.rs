//! Ship commands and the per-player command history.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::entity::{PlanetIndex, PlayerId, ShipIndex};
use crate::rules::MAX_QUEUED_MOVES;

/// A command for exactly one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Move {
    /// No command was issued for the ship.
    #[default]
    Noop,
    /// Turn by the given number of degrees (positive is counter-clockwise).
    Rotate(i16),
    /// Move along the current heading by the given distance this turn.
    Thrust(i16),
    /// Start docking to the planet.
    Dock(PlanetIndex),
    /// Start undocking from the current planet.
    Undock,
    /// A command that was well-formed but could not be executed.
    Error,
}

/// One turn of commands for one player, keyed by ship slot.
///
/// Ships without an entry are treated as [`Move::Noop`].
pub type PlayerMoves = BTreeMap<ShipIndex, Move>;

/// Commands of every player for one turn, indexed by player.
pub type TurnMoves = Vec<PlayerMoves>;

/// Rolling window of the most recent turns of commands for one player.
///
/// Newest turn first. Purely diagnostic: the resolver never reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandQueue {
    turns: VecDeque<(u32, PlayerMoves)>,
}

impl CommandQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: VecDeque::with_capacity(MAX_QUEUED_MOVES),
        }
    }

    /// Record a turn of commands, evicting the oldest beyond the window.
    pub fn push(&mut self, turn: u32, moves: PlayerMoves) {
        self.turns.push_front((turn, moves));
        self.turns.truncate(MAX_QUEUED_MOVES);
    }

    /// Commands of the most recent recorded turn.
    #[must_use]
    pub fn latest(&self) -> Option<&PlayerMoves> {
        self.turns.front().map(|(_, moves)| moves)
    }

    /// Commands recorded for a specific turn, if still in the window.
    #[must_use]
    pub fn for_turn(&self, turn: u32) -> Option<&PlayerMoves> {
        self.turns
            .iter()
            .find(|(t, _)| *t == turn)
            .map(|(_, moves)| moves)
    }

    /// The command a ship received `turns_ago` turns back (0 = latest).
    #[must_use]
    pub fn move_for(&self, turns_ago: usize, ship: ShipIndex) -> Move {
        self.turns
            .get(turns_ago)
            .and_then(|(_, moves)| moves.get(&ship).copied())
            .unwrap_or_default()
    }

    /// Number of turns held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Command queues for every player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveQueue {
    players: Vec<CommandQueue>,
}

impl MoveQueue {
    /// Queues for `players` players.
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            players: vec![CommandQueue::new(); players],
        }
    }

    /// Queue of one player.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&CommandQueue> {
        self.players.get(usize::from(player))
    }

    /// Mutable queue of one player.
    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut CommandQueue> {
        self.players.get_mut(usize::from(player))
    }
}
