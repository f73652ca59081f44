//! Entity model: ships, planets and the references that name them.
//!
//! Entities are plain data. The resolver owns all behaviour; the only logic
//! here keeps individual records consistent (health clamping, docking reset).

use serde::{Deserialize, Serialize};

use crate::math::{fixed_sqrt, Fixed, Vec2Fixed};
use crate::rules::SHIP_BASE_HEALTH;

/// Player tag, assigned in join order starting at 0.
pub type PlayerId = u8;

/// Index of a ship inside its owner's ship table.
pub type ShipIndex = usize;

/// Index of a planet inside the world's planet list.
pub type PlanetIndex = usize;

/// Position on the map.
pub type Location = Vec2Fixed;

/// Behaviour shared by ships and planets.
pub trait Entity {
    /// Current position.
    fn location(&self) -> Location;

    /// Current health.
    fn health(&self) -> u16;

    /// Mutable access to health.
    fn health_mut(&mut self) -> &mut u16;

    /// Whether the entity still participates in play.
    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Force health to zero.
    fn kill(&mut self) {
        *self.health_mut() = 0;
    }

    /// Subtract damage, saturating at zero. Returns the damage actually taken.
    fn apply_damage(&mut self, amount: u16) -> u16 {
        let health = self.health_mut();
        let actual = amount.min(*health);
        *health -= actual;
        actual
    }
}

/// Docking state of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DockingStatus {
    /// Free to move.
    #[default]
    Undocked,
    /// Attaching to a planet.
    Docking,
    /// Attached and producing.
    Docked,
    /// Detaching from a planet.
    Undocking,
}

impl DockingStatus {
    /// Numeric code used by the agent protocol.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Undocked => 0,
            Self::Docking => 1,
            Self::Docked => 2,
            Self::Undocking => 3,
        }
    }
}

/// A ship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    /// Position.
    pub location: Location,
    /// Health, zero once destroyed.
    pub health: u16,
    /// Heading in degrees (0-359) from due east.
    pub orientation: u16,
    /// Docking state.
    pub docking_status: DockingStatus,
    /// Turns spent in the current docking transition.
    pub docking_progress: u16,
    /// Planet this ship is attached to while not undocked.
    pub docked_planet: Option<PlanetIndex>,
}

impl Ship {
    /// A fresh, undocked ship at full health.
    #[must_use]
    pub fn new(location: Location, orientation: u16) -> Self {
        Self {
            location,
            health: SHIP_BASE_HEALTH,
            orientation: orientation % 360,
            docking_status: DockingStatus::Undocked,
            docking_progress: 0,
            docked_planet: None,
        }
    }

    /// Return to the undocked state.
    pub fn reset_docking_status(&mut self) {
        self.docking_status = DockingStatus::Undocked;
        self.docking_progress = 0;
        self.docked_planet = None;
    }

    /// Whether the ship may rotate or thrust this turn.
    #[must_use]
    pub fn is_undocked(&self) -> bool {
        self.docking_status == DockingStatus::Undocked
    }
}

impl Entity for Ship {
    fn location(&self) -> Location {
        self.location
    }

    fn health(&self) -> u16 {
        self.health
    }

    fn health_mut(&mut self) -> &mut u16 {
        &mut self.health
    }
}

/// A planet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
    /// Centre of the planet.
    pub location: Location,
    /// Health, zero once destroyed.
    pub health: u16,
    /// Owning player, if any.
    pub owner: Option<PlayerId>,
    /// Radius in map units.
    pub radius: u16,
    /// Maximum number of ships attached at once.
    pub docking_spots: u16,
    /// Production left before the planet is exhausted.
    pub remaining_production: u16,
    /// Production accumulated toward the next ship.
    pub current_production: u16,
    /// Ships of the owner that are docking, docked or undocking, in arrival order.
    pub docked_ships: Vec<ShipIndex>,
}

impl Planet {
    /// Create an unowned planet; health and capacity derive from the radius.
    #[must_use]
    pub fn new(location: Location, radius: u16) -> Self {
        Self {
            location,
            health: Self::base_health(radius),
            owner: None,
            radius,
            docking_spots: radius,
            remaining_production: radius.saturating_mul(100),
            current_production: 0,
            docked_ships: Vec::new(),
        }
    }

    /// Starting health for a planet of the given radius: `500 + 100·sqrt(radius)`.
    #[must_use]
    pub fn base_health(radius: u16) -> u16 {
        let root = fixed_sqrt(Fixed::from_num(radius));
        let health = Fixed::from_num(500) + root * 100;
        health.to_num::<u32>().min(u32::from(u16::MAX)) as u16
    }

    /// Radius in fixed point.
    #[must_use]
    pub fn radius_fixed(&self) -> Fixed {
        Fixed::from_num(self.radius)
    }

    /// Whether another ship can be attached.
    #[must_use]
    pub fn has_free_spot(&self) -> bool {
        self.docked_ships.len() < usize::from(self.docking_spots)
    }

    /// Detach a ship from the dock list. Returns whether it was present.
    ///
    /// The planet becomes unowned once its last ship leaves.
    pub fn release_ship(&mut self, ship: ShipIndex) -> bool {
        let before = self.docked_ships.len();
        self.docked_ships.retain(|&s| s != ship);
        let removed = self.docked_ships.len() != before;
        if self.docked_ships.is_empty() {
            self.owner = None;
        }
        removed
    }
}

impl Entity for Planet {
    fn location(&self) -> Location {
        self.location
    }

    fn health(&self) -> u16 {
        self.health
    }

    fn health_mut(&mut self) -> &mut u16 {
        &mut self.health
    }
}

/// Stateless handle naming any entity.
///
/// Ordering is total (invalid < ships by owner then index < planets), which
/// the collision pass relies on for a deterministic resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// Names nothing.
    Invalid,
    /// A ship slot of a player.
    Ship {
        /// Owning player.
        owner: PlayerId,
        /// Slot in the owner's table.
        index: ShipIndex,
    },
    /// A planet.
    Planet {
        /// Index into the planet list.
        index: PlanetIndex,
    },
}

impl EntityRef {
    /// The "no entity" sentinel.
    #[must_use]
    pub const fn invalid() -> Self {
        Self::Invalid
    }

    /// Reference to a ship.
    #[must_use]
    pub const fn ship(owner: PlayerId, index: ShipIndex) -> Self {
        Self::Ship { owner, index }
    }

    /// Reference to a planet.
    #[must_use]
    pub const fn planet(index: PlanetIndex) -> Self {
        Self::Planet { index }
    }

    /// Whether this names an entity at all.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Whether this names a ship.
    #[must_use]
    pub const fn is_ship(self) -> bool {
        matches!(self, Self::Ship { .. })
    }

    /// Whether this names a planet.
    #[must_use]
    pub const fn is_planet(self) -> bool {
        matches!(self, Self::Planet { .. })
    }
}
