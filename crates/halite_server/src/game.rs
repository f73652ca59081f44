//! The match loop.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use halite_core::entity::PlayerId;
use halite_core::error::GameError;
use halite_core::map_generation::{generate_map, MapConfig};
use halite_core::moves::{MoveQueue, PlayerMoves, TurnMoves};
use halite_core::replay::Replay;
use halite_core::resolver::{kill_player, resolve_turn};
use halite_core::rules::GameConstants;
use halite_core::stats::{GameStatistics, MatchStats};
use halite_core::world::World;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::ingestion::{collect_moves, collect_names, Outcome};

/// Turn limit for a map: `100 + sqrt(width * height)`.
#[must_use]
pub fn default_max_turns(width: u16, height: u16) -> u32 {
    100 + (f64::from(width) * f64::from(height)).sqrt() as u32
}

/// One match between a set of agents.
///
/// Owns the world for the whole match; agent `i` plays as player `i`.
pub struct Match {
    config: ServerConfig,
    constants: GameConstants,
    seed: u64,
    world: World,
    agents: Vec<Box<dyn Agent>>,
    names: Vec<String>,
    stats: MatchStats,
    queue: MoveQueue,
}

impl Match {
    /// Generate a map from the configuration and seat the agents on it.
    ///
    /// # Errors
    /// Returns an error if the settings, constants file or agent count are
    /// invalid.
    pub fn new(config: ServerConfig, agents: Vec<Box<dyn Agent>>) -> Result<Self> {
        if agents.len() != config.players {
            return Err(ServerError::Config(format!(
                "{} agents for {} players",
                agents.len(),
                config.players
            )));
        }
        let constants = config.load_constants()?;
        let seed = config.resolved_seed();
        let world = generate_map(&MapConfig {
            width: config.width,
            height: config.height,
            players: config.players,
            seed,
            ..MapConfig::default()
        })?;
        Self::with_world(config, constants, seed, world, agents)
    }

    /// Play on a prepared world.
    ///
    /// # Errors
    /// Returns an error if the agent count does not match the world or the
    /// settings are invalid.
    pub fn with_world(
        config: ServerConfig,
        constants: GameConstants,
        seed: u64,
        world: World,
        agents: Vec<Box<dyn Agent>>,
    ) -> Result<Self> {
        config.validate()?;
        constants.validate()?;
        let players = world.player_count();
        if agents.len() != players {
            return Err(ServerError::Config(format!(
                "{} agents for a {players}-player map",
                agents.len()
            )));
        }

        Ok(Self {
            config,
            constants,
            seed,
            world,
            agents,
            names: vec![String::new(); players],
            stats: MatchStats::new(players),
            queue: MoveQueue::new(players),
        })
    }

    /// Current world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Last turn that will be played.
    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.config
            .max_turns
            .unwrap_or_else(|| default_max_turns(self.world.width, self.world.height))
    }

    /// Play the match to the end.
    ///
    /// # Errors
    /// Only world invariant violations and replay IO abort a match; agent
    /// failures eliminate the agent instead.
    pub async fn run(mut self) -> Result<GameStatistics> {
        let max_turns = self.max_turns();
        info!(
            players = self.world.player_count(),
            width = self.world.width,
            height = self.world.height,
            seed = self.seed,
            max_turns,
            "Match starting"
        );

        self.handshake().await?;

        let mut replay = self.config.replay_enabled.then(|| {
            Replay::new(
                self.seed,
                self.names.clone(),
                &self.world,
                self.constants.clone(),
            )
        });
        self.stats.observe_turn(&self.world, 0);

        let mut turn = 0;
        while turn < max_turns && self.is_contested() {
            turn += 1;
            let (moves, eliminated) = self.ingest(turn).await?;

            let outcome = resolve_turn(&mut self.world, &moves, &self.constants, turn)?;
            for rejected in &outcome.events.rejected {
                debug!(
                    turn,
                    player = rejected.player,
                    ship = rejected.ship,
                    reason = ?rejected.reason,
                    "Command rejected"
                );
            }

            self.eliminate_empty_fleets(turn)?;
            self.stats.observe_turn(&self.world, turn);
            if let Some(replay) = replay.as_mut() {
                replay.record_turn(
                    eliminated,
                    self.queued_commands(turn),
                    outcome.validated,
                    &self.world,
                );
            }
        }

        let final_hash = self.world.state_hash();
        info!(
            turn,
            final_hash,
            survivors = ?self.stats.alive_players(),
            "Match finished"
        );

        let output_filename = match replay {
            Some(mut replay) => {
                replay.finalize(turn, final_hash);
                Some(self.save_replay(&replay)?)
            }
            None => None,
        };

        let timeout_log_filenames = self
            .stats
            .timeout_tags()
            .iter()
            .filter_map(|&player| self.agents.get(usize::from(player))?.log_filename())
            .collect();
        for agent in &mut self.agents {
            agent.shutdown().await;
        }

        Ok(self
            .stats
            .finalize(&self.names, output_filename, timeout_log_filenames))
    }

    /// Whether enough players remain for another turn.
    fn is_contested(&self) -> bool {
        let needed = if self.world.player_count() == 1 { 1 } else { 2 };
        self.stats.alive_players().len() >= needed
    }

    async fn handshake(&mut self) -> Result<()> {
        let deadline = self.config.init_deadline();
        let outcomes = collect_names(&mut self.agents, &self.world, deadline).await;
        for (player, outcome) in outcomes {
            match outcome {
                Outcome::Responded { value, elapsed } => {
                    info!(player, name = %value, ?elapsed, "Agent ready");
                    self.stats.record_init_response(player, elapsed);
                    self.names[usize::from(player)] = value;
                }
                Outcome::TimedOut { reason } => {
                    warn!(player, ?reason, "Agent failed the init handshake");
                    self.fail(player, 0)?;
                }
            }
        }
        Ok(())
    }

    /// Collect this turn's commands, eliminating agents that failed.
    async fn ingest(&mut self, turn: u32) -> Result<(TurnMoves, Vec<PlayerId>)> {
        let alive: Vec<bool> = self
            .world
            .players()
            .map(|player| self.stats.is_alive(player))
            .collect();
        let deadline = self.config.turn_deadline();
        let outcomes = collect_moves(&mut self.agents, &alive, &self.world, deadline).await;

        let mut moves = vec![PlayerMoves::new(); self.world.player_count()];
        let mut eliminated = Vec::new();
        for (player, outcome) in outcomes {
            match outcome {
                Outcome::Responded { value, elapsed } => {
                    self.stats.record_frame_response(player, elapsed);
                    if let Some(queue) = self.queue.player_mut(player) {
                        queue.push(turn, value.clone());
                    }
                    moves[usize::from(player)] = value;
                }
                Outcome::TimedOut { reason } => {
                    warn!(turn, player, ?reason, "Agent failed to respond");
                    if self.fail(player, turn)? {
                        eliminated.push(player);
                    } else if let Some(queue) = self.queue.player_mut(player) {
                        queue.push(turn, PlayerMoves::new());
                    }
                }
            }
        }
        Ok((moves, eliminated))
    }

    /// Commands each player queued for `turn`, empty for players that sent
    /// none.
    fn queued_commands(&self, turn: u32) -> TurnMoves {
        self.world
            .players()
            .map(|player| {
                self.queue
                    .player(player)
                    .and_then(|queue| queue.for_turn(turn))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Record a failed exchange. Returns true if the player was eliminated.
    fn fail(&mut self, player: PlayerId, turn: u32) -> Result<bool> {
        self.stats.record_timeout(player);
        if self.config.ignore_timeout {
            return Ok(false);
        }
        kill_player(&mut self.world, &mut self.stats, player, turn)?;
        Ok(true)
    }

    fn eliminate_empty_fleets(&mut self, turn: u32) -> Result<()> {
        let players: Vec<PlayerId> = self.world.players().collect();
        for player in players {
            if self.stats.is_alive(player) && !self.world.player_has_ships(player) {
                kill_player(&mut self.world, &mut self.stats, player, turn)?;
            }
        }
        Ok(())
    }

    fn save_replay(&self, replay: &Replay) -> Result<PathBuf> {
        let directory = &self.config.replay_directory;
        std::fs::create_dir_all(directory).map_err(|source| GameError::Io {
            path: directory.display().to_string(),
            source,
        })?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let path = directory.join(format!("replay-{stamp}-{}.hlt", self.seed));
        replay.save(&path)?;
        info!(path = %path.display(), "Replay saved");
        Ok(path)
    }
}
