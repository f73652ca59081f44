//! Match recording and playback.
//!
//! A replay stores every world frame together with the commands and
//! eliminations that produced it. Agent commands are kept as sent, next to
//! the validated moves the resolver applied. Frames make playback cheap; the
//! validated moves allow [`ReplayPlayer::verify`] to re-resolve the match and prove the
//! recording is consistent with the current rules.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::entity::PlayerId;
use crate::error::{GameError, Result};
use crate::moves::TurnMoves;
use crate::resolver::{kill_player, resolve_turn};
use crate::rules::GameConstants;
use crate::stats::MatchStats;
use crate::world::World;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 2;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Seed the map was generated from.
    pub seed: u64,
    /// Map width.
    pub width: u16,
    /// Map height.
    pub height: u16,
    /// Names reported by the agents, by player tag.
    pub player_names: Vec<String>,
    /// Balance parameters the match was played with.
    pub constants: GameConstants,
    /// World after each turn; frame 0 is the starting layout.
    pub frames: Vec<World>,
    /// Commands each player sent, turn 1 first, including rejected ones.
    pub commands: Vec<TurnMoves>,
    /// Validated moves of each turn, turn 1 first.
    pub moves: Vec<TurnMoves>,
    /// Players removed before each turn was resolved.
    pub eliminations: Vec<Vec<PlayerId>>,
    /// Last turn played.
    pub final_turn: u32,
    /// Hash of the last frame.
    pub final_hash: u64,
}

impl Replay {
    /// Start a recording from the initial world.
    #[must_use]
    pub fn new(
        seed: u64,
        player_names: Vec<String>,
        initial: &World,
        constants: GameConstants,
    ) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            width: initial.width,
            height: initial.height,
            player_names,
            constants,
            frames: vec![initial.clone()],
            commands: Vec::new(),
            moves: Vec::new(),
            eliminations: Vec::new(),
            final_turn: 0,
            final_hash: initial.state_hash(),
        }
    }

    /// Record one resolved turn.
    ///
    /// `commands` are the moves as the agents sent them, `moves` the
    /// validated moves the resolver returned for them.
    pub fn record_turn(
        &mut self,
        eliminated: Vec<PlayerId>,
        commands: TurnMoves,
        moves: TurnMoves,
        frame: &World,
    ) {
        self.eliminations.push(eliminated);
        self.commands.push(commands);
        self.moves.push(moves);
        self.frames.push(frame.clone());
    }

    /// Finalize the replay with end-game state.
    pub fn finalize(&mut self, final_turn: u32, final_hash: u64) {
        self.final_turn = final_turn;
        self.final_hash = final_hash;
    }

    /// Number of turns recorded.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.moves.len()
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path, bytes).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// file was written by an incompatible version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    current_turn: u32,
}

impl ReplayPlayer {
    /// Create a player positioned on the starting frame.
    ///
    /// # Errors
    /// Returns an error if the replay has no frames or its frame count does
    /// not match its command stream.
    pub fn new(replay: Replay) -> Result<Self> {
        if replay.frames.len() != replay.moves.len() + 1
            || replay.eliminations.len() != replay.moves.len()
            || replay.commands.len() != replay.moves.len()
        {
            return Err(GameError::Serialization(format!(
                "Replay has {} frames for {} turns",
                replay.frames.len(),
                replay.moves.len()
            )));
        }
        Ok(Self {
            replay,
            current_turn: 0,
        })
    }

    /// Step one frame forward.
    ///
    /// Returns true if there are more turns to play.
    pub fn advance(&mut self) -> bool {
        if self.current_turn < self.replay.final_turn {
            self.current_turn += 1;
        }
        self.current_turn < self.replay.final_turn
    }

    /// Jump to a turn, clamped to the recorded range.
    pub fn seek(&mut self, turn: u32) {
        self.current_turn = turn.min(self.replay.final_turn);
    }

    /// Get the current turn.
    #[must_use]
    pub const fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// World as of the current turn.
    #[must_use]
    pub fn world(&self) -> &World {
        let last = self.replay.frames.len() - 1;
        &self.replay.frames[(self.current_turn as usize).min(last)]
    }

    /// Get the replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Check if the replay has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_turn >= self.replay.final_turn
    }

    /// Get progress as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.final_turn == 0 {
            100.0
        } else {
            f64::from(self.current_turn) / f64::from(self.replay.final_turn) * 100.0
        }
    }

    /// Re-resolve every recorded turn and compare against the frames.
    ///
    /// Returns `Ok(false)` at the first frame whose hash differs.
    ///
    /// # Errors
    /// Returns an error if re-resolution itself fails.
    pub fn verify(&self) -> Result<bool> {
        let replay = &self.replay;
        let mut world = replay.frames[0].clone();
        let mut stats = MatchStats::new(world.player_count());

        for (index, moves) in replay.moves.iter().enumerate() {
            let turn = index as u32 + 1;
            for &player in &replay.eliminations[index] {
                kill_player(&mut world, &mut stats, player, turn)?;
            }
            resolve_turn(&mut world, moves, &replay.constants, turn)?;

            if world.state_hash() != replay.frames[index + 1].state_hash() {
                warn!(turn, "Replay diverged from recording");
                return Ok(false);
            }
        }

        Ok(world.state_hash() == replay.final_hash)
    }
}
