//! Match statistics, elimination bookkeeping and final ranking.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::PlayerId;
use crate::world::World;

/// Running record of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Whether the player is still in play.
    pub alive: bool,
    /// Last turn the player was alive at the end of.
    pub last_frame_alive: u32,
    /// Ships alive at the last observation or elimination.
    pub last_ship_count: u32,
    /// Summed ship health at the last observation or elimination.
    pub last_ship_health_total: u32,
    /// Time taken to answer the init handshake.
    pub init_response_time: Option<Duration>,
    /// Total time taken answering turn requests.
    pub total_frame_response_time: Duration,
    /// Number of turn requests answered in time.
    pub answered_frames: u32,
}

impl PlayerRecord {
    /// Mean per-turn response time.
    #[must_use]
    pub fn average_frame_response_time(&self) -> Duration {
        if self.answered_frames == 0 {
            Duration::ZERO
        } else {
            self.total_frame_response_time / self.answered_frames
        }
    }
}

/// Statistics tracked while a match runs.
#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    players: Vec<PlayerRecord>,
    timeout_tags: BTreeSet<PlayerId>,
}

impl MatchStats {
    /// Fresh statistics with every player alive.
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            players: vec![
                PlayerRecord {
                    alive: true,
                    ..PlayerRecord::default()
                };
                players
            ],
            timeout_tags: BTreeSet::new(),
        }
    }

    /// Record of one player.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(usize::from(player))
    }

    fn player_mut(&mut self, player: PlayerId) -> Option<&mut PlayerRecord> {
        self.players.get_mut(usize::from(player))
    }

    /// Whether a player is still in play.
    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        self.player(player).is_some_and(|p| p.alive)
    }

    /// Players still in play, ascending.
    #[must_use]
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(i, _)| i as PlayerId)
            .collect()
    }

    /// Players that failed to answer at some point.
    #[must_use]
    pub fn timeout_tags(&self) -> &BTreeSet<PlayerId> {
        &self.timeout_tags
    }

    /// Store the init handshake latency.
    pub fn record_init_response(&mut self, player: PlayerId, elapsed: Duration) {
        if let Some(record) = self.player_mut(player) {
            record.init_response_time = Some(elapsed);
        }
    }

    /// Add one answered turn's latency.
    pub fn record_frame_response(&mut self, player: PlayerId, elapsed: Duration) {
        if let Some(record) = self.player_mut(player) {
            record.total_frame_response_time += elapsed;
            record.answered_frames += 1;
        }
    }

    /// Flag a player whose agent missed a deadline or sent garbage.
    pub fn record_timeout(&mut self, player: PlayerId) {
        self.timeout_tags.insert(player);
    }

    /// Update survivors after a turn has been fully resolved.
    pub fn observe_turn(&mut self, world: &World, turn: u32) {
        for (index, record) in self.players.iter_mut().enumerate() {
            if record.alive {
                let player = index as PlayerId;
                record.last_frame_alive = turn;
                record.last_ship_count = world.player_ship_count(player) as u32;
                record.last_ship_health_total = world.player_health_total(player);
            }
        }
    }

    /// Mark a player eliminated, fixing its final standing.
    ///
    /// Returns `false` if the player was already out.
    pub fn record_elimination(
        &mut self,
        player: PlayerId,
        turn: u32,
        ship_count: u32,
        health_total: u32,
    ) -> bool {
        let Some(record) = self.player_mut(player) else {
            return false;
        };
        if !record.alive {
            return false;
        }
        record.alive = false;
        record.last_frame_alive = turn;
        record.last_ship_count = ship_count;
        record.last_ship_health_total = health_total;
        true
    }

    /// Order two players by final standing; `Less` means `p1` places higher.
    ///
    /// Later elimination wins; ties go to more ships, then more total ship
    /// health, then the lower player tag.
    #[must_use]
    pub fn compare_rankings(&self, p1: PlayerId, p2: PlayerId) -> Ordering {
        let default = PlayerRecord::default();
        let a = self.player(p1).unwrap_or(&default);
        let b = self.player(p2).unwrap_or(&default);
        b.last_frame_alive
            .cmp(&a.last_frame_alive)
            .then(b.last_ship_count.cmp(&a.last_ship_count))
            .then(b.last_ship_health_total.cmp(&a.last_ship_health_total))
            .then(p1.cmp(&p2))
    }

    /// All players from first place to last.
    #[must_use]
    pub fn rankings(&self) -> Vec<PlayerId> {
        let mut order: Vec<PlayerId> = (0..self.players.len()).map(|p| p as PlayerId).collect();
        order.sort_by(|&a, &b| self.compare_rankings(a, b));
        order
    }

    /// Build the match result.
    #[must_use]
    pub fn finalize(
        &self,
        names: &[String],
        output_filename: Option<PathBuf>,
        timeout_log_filenames: Vec<String>,
    ) -> GameStatistics {
        let ranking = self.rankings();
        let player_statistics = self
            .players
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let tag = index as PlayerId;
                let rank = ranking.iter().position(|&p| p == tag).unwrap_or(index) + 1;
                PlayerStatistics {
                    tag,
                    name: names.get(index).cloned().unwrap_or_default(),
                    rank: rank as u32,
                    last_frame_alive: record.last_frame_alive,
                    init_response_time_ms: record
                        .init_response_time
                        .map_or(0, |d| d.as_millis() as u64),
                    average_frame_response_time_ms: record
                        .average_frame_response_time()
                        .as_secs_f64()
                        * 1000.0,
                }
            })
            .collect();

        GameStatistics {
            player_statistics,
            output_filename,
            timeout_tags: self.timeout_tags.clone(),
            timeout_log_filenames,
        }
    }
}

/// Final result line for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    /// Player tag.
    pub tag: PlayerId,
    /// Name reported by the agent.
    pub name: String,
    /// Final placement, 1 is the winner.
    pub rank: u32,
    /// Last turn the player was alive.
    pub last_frame_alive: u32,
    /// Init handshake latency.
    pub init_response_time_ms: u64,
    /// Mean per-turn latency.
    pub average_frame_response_time_ms: f64,
}

/// Result of a whole match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// One entry per player, in tag order.
    pub player_statistics: Vec<PlayerStatistics>,
    /// Where the replay was written, if anywhere.
    pub output_filename: Option<PathBuf>,
    /// Players that missed a deadline.
    pub timeout_tags: BTreeSet<PlayerId>,
    /// Diagnostic logs of timed-out players.
    pub timeout_log_filenames: Vec<String>,
}
