//! Game-balance constants.
//!
//! Every tunable number the resolver uses lives in [`GameConstants`], which
//! can be loaded from a RON file so recorded matches can be re-checked against
//! different balance parameters without recompiling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Sub-steps per turn used for continuous collision detection.
pub const SUBSTEPS: u32 = 128;

/// Most players a match supports.
pub const MAX_PLAYERS: usize = 4;

/// Turns of Move history kept per player.
pub const MAX_QUEUED_MOVES: usize = 3;

/// Starting (and maximum) health of a ship.
pub const SHIP_BASE_HEALTH: u16 = 200;

/// Turns needed to finish docking or undocking.
pub const DOCK_TURNS: u16 = 5;

/// Production consumed to spawn one ship.
pub const PRODUCTION_PER_SHIP: u16 = 100;

/// Tunable game-balance parameters.
///
/// Distances are in map units, damage in health points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConstants {
    /// Sub-steps per turn.
    pub substeps: u32,
    /// Collision radius of a ship.
    pub ship_radius: f64,
    /// Damage each ship deals to the other on contact.
    pub weapon_damage: u16,
    /// Damage a ship deals to a planet it rams.
    pub planet_impact_damage: u16,
    /// Maximum thrust magnitude per turn.
    pub max_thrust: i16,
    /// Maximum rotation per turn, either direction.
    pub max_rotation: i16,
    /// Maximum distance from a planet's surface to start docking.
    pub dock_radius: f64,
    /// Turns to dock or undock.
    pub dock_turns: u16,
    /// Production per docked ship per turn.
    pub production_per_docked_ship: u16,
    /// Production needed for one new ship.
    pub production_per_ship: u16,
    /// Explosion radius as a multiple of the planet radius.
    pub explosion_radius_factor: f64,
    /// Damage at the planet surface when it explodes.
    pub explosion_damage: u16,
    /// Distance from a planet's surface at which spawned ships appear.
    pub spawn_offset: f64,
    /// Side length of a collision-map cell.
    pub collision_cell_size: u32,
    /// Ship slots available to each player over the whole match.
    pub max_ships_per_player: usize,
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            substeps: SUBSTEPS,
            ship_radius: 0.5,
            weapon_damage: 100,
            planet_impact_damage: 100,
            max_thrust: 7,
            max_rotation: 90,
            dock_radius: 4.0,
            dock_turns: DOCK_TURNS,
            production_per_docked_ship: 6,
            production_per_ship: PRODUCTION_PER_SHIP,
            explosion_radius_factor: 2.0,
            explosion_damage: 250,
            spawn_offset: 2.0,
            collision_cell_size: 8,
            max_ships_per_player: 40,
        }
    }
}

impl GameConstants {
    /// Parse constants from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let constants: Self = ron::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        constants.validate()?;
        Ok(constants)
    }

    /// Load constants from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Reject values the resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.substeps == 0 {
            return Err(GameError::Config("substeps must be positive".into()));
        }
        if f64::from(self.collision_cell_size) < 2.0 * self.ship_radius {
            return Err(GameError::Config(
                "collision_cell_size must be at least one ship diameter".into(),
            ));
        }
        if self.dock_turns == 0 {
            return Err(GameError::Config("dock_turns must be positive".into()));
        }
        if self.production_per_ship == 0 {
            return Err(GameError::Config("production_per_ship must be positive".into()));
        }
        if self.ship_radius <= 0.0 || self.explosion_radius_factor < 1.0 {
            return Err(GameError::Config(
                "ship_radius must be positive and explosion_radius_factor at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Ship radius in fixed point.
    #[must_use]
    pub fn ship_radius_fixed(&self) -> Fixed {
        Fixed::from_num(self.ship_radius)
    }

    /// Docking range in fixed point.
    #[must_use]
    pub fn dock_radius_fixed(&self) -> Fixed {
        Fixed::from_num(self.dock_radius)
    }

    /// Spawn ring offset in fixed point.
    #[must_use]
    pub fn spawn_offset_fixed(&self) -> Fixed {
        Fixed::from_num(self.spawn_offset)
    }

    /// Explosion radius factor in fixed point.
    #[must_use]
    pub fn explosion_radius_factor_fixed(&self) -> Fixed {
        Fixed::from_num(self.explosion_radius_factor)
    }
}
