//! Match host settings.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{ArgAction, Args};
use halite_core::rules::GameConstants;

use crate::error::{Result, ServerError};

/// Default map width.
pub const DEFAULT_WIDTH: u16 = 240;

/// Default map height.
pub const DEFAULT_HEIGHT: u16 = 160;

/// Time an agent has to answer the init handshake.
pub const DEFAULT_INIT_DEADLINE_MS: u64 = 60_000;

/// Time an agent has to answer each turn.
pub const DEFAULT_TURN_DEADLINE_MS: u64 = 2_000;

/// Match host configuration.
///
/// Parsed from command-line flags by the `halite_server` binary; tests build
/// it from [`Default`] and override fields.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ServerConfig {
    /// Map width
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u16,

    /// Map height
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u16,

    /// Map seed (random when omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of players; must match the number of agents
    #[arg(skip = 2usize)]
    pub players: usize,

    /// Never eliminate slow or misbehaving agents
    #[arg(long)]
    pub ignore_timeout: bool,

    /// Do not write a replay file
    #[arg(long = "no-replay", action = ArgAction::SetFalse)]
    pub replay_enabled: bool,

    /// Directory replay files are written to
    #[arg(long, default_value = ".")]
    pub replay_directory: PathBuf,

    /// Directory agent stderr logs are written to (inherited when omitted)
    #[arg(long)]
    pub log_directory: Option<PathBuf>,

    /// Init handshake deadline in milliseconds
    #[arg(long, default_value_t = DEFAULT_INIT_DEADLINE_MS)]
    pub init_deadline_ms: u64,

    /// Per-turn deadline in milliseconds
    #[arg(long, default_value_t = DEFAULT_TURN_DEADLINE_MS)]
    pub turn_deadline_ms: u64,

    /// Turn limit (default: 100 + sqrt(width * height))
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// RON file overriding the game constants
    #[arg(long)]
    pub constants: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            players: 2,
            ignore_timeout: false,
            replay_enabled: true,
            replay_directory: PathBuf::from("."),
            log_directory: None,
            init_deadline_ms: DEFAULT_INIT_DEADLINE_MS,
            turn_deadline_ms: DEFAULT_TURN_DEADLINE_MS,
            max_turns: None,
            constants: None,
        }
    }
}

impl ServerConfig {
    /// Deadline for the init handshake, `None` when timeouts are ignored.
    #[must_use]
    pub fn init_deadline(&self) -> Option<Duration> {
        (!self.ignore_timeout).then(|| Duration::from_millis(self.init_deadline_ms))
    }

    /// Deadline for each turn, `None` when timeouts are ignored.
    #[must_use]
    pub fn turn_deadline(&self) -> Option<Duration> {
        (!self.ignore_timeout).then(|| Duration::from_millis(self.turn_deadline_ms))
    }

    /// The configured seed, or one taken from the clock.
    #[must_use]
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |elapsed| elapsed.as_nanos() as u64)
        })
    }

    /// Game constants from the configured RON file, or the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or holds invalid values.
    pub fn load_constants(&self) -> Result<GameConstants> {
        match &self.constants {
            Some(path) => Ok(GameConstants::load(path)?),
            None => Ok(GameConstants::default()),
        }
    }

    /// Check settings that clap cannot express.
    ///
    /// # Errors
    /// Returns [`ServerError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.turn_deadline_ms == 0 || self.init_deadline_ms == 0 {
            return Err(ServerError::Config("deadlines must be positive".into()));
        }
        if self.max_turns == Some(0) {
            return Err(ServerError::Config("max_turns must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: ServerConfig,
    }

    #[test]
    fn test_flags_default_to_default_impl() {
        let cli = Cli::parse_from(["halite_server"]);
        assert_eq!(cli.config, ServerConfig::default());
        assert_eq!(cli.config.players, 2);
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "halite_server",
            "--width",
            "120",
            "--seed",
            "42",
            "--no-replay",
            "--ignore-timeout",
            "--max-turns",
            "50",
        ]);
        assert_eq!(cli.config.width, 120);
        assert_eq!(cli.config.seed, Some(42));
        assert!(!cli.config.replay_enabled);
        assert!(cli.config.ignore_timeout);
        assert_eq!(cli.config.max_turns, Some(50));
    }

    #[test]
    fn test_ignore_timeout_drops_deadlines() {
        let mut config = ServerConfig::default();
        assert_eq!(config.turn_deadline(), Some(Duration::from_millis(2_000)));
        config.ignore_timeout = true;
        assert_eq!(config.turn_deadline(), None);
        assert_eq!(config.init_deadline(), None);
    }

    #[test]
    fn test_explicit_seed_is_kept() {
        let config = ServerConfig {
            seed: Some(7),
            ..ServerConfig::default()
        };
        assert_eq!(config.resolved_seed(), 7);
    }

    #[test]
    fn test_constants_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constants.ron");
        std::fs::write(&path, "(weapon_damage: 64)").unwrap();

        let config = ServerConfig {
            constants: Some(path),
            ..ServerConfig::default()
        };
        assert_eq!(config.load_constants().unwrap().weapon_damage, 64);
        assert!(ServerConfig::default().load_constants().is_ok());
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let config = ServerConfig {
            turn_deadline_ms: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }
}
