//! Authoritative world state for one match.
//!
//! Ships live in per-player tables indexed by slot; planets live in a single
//! list. Indices are never reused, so an [`EntityRef`] stays valid (though
//! possibly naming a dead entity) for the whole match.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityRef, Location, Planet, PlanetIndex, PlayerId, Ship, ShipIndex};
use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Snapshot of every entity on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct World {
    /// Map width in units.
    pub width: u16,
    /// Map height in units.
    pub height: u16,
    /// Ship tables, indexed by player then slot.
    pub ships: Vec<Vec<Ship>>,
    /// Planets; destroyed planets stay in place with zero health.
    pub planets: Vec<Planet>,
}

impl World {
    /// Create an empty world for `players` players.
    #[must_use]
    pub fn new(width: u16, height: u16, players: usize) -> Self {
        Self {
            width,
            height,
            ships: vec![Vec::new(); players],
            planets: Vec::new(),
        }
    }

    /// Number of players, alive or not.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.ships.len()
    }

    /// Iterator over all player tags.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.ships.len()).map(|p| p as PlayerId)
    }

    /// Look up a ship.
    pub fn ship(&self, owner: PlayerId, index: ShipIndex) -> Result<&Ship> {
        self.ships
            .get(usize::from(owner))
            .and_then(|table| table.get(index))
            .ok_or(GameError::InvalidEntity(EntityRef::ship(owner, index)))
    }

    /// Look up a ship mutably.
    pub fn ship_mut(&mut self, owner: PlayerId, index: ShipIndex) -> Result<&mut Ship> {
        self.ships
            .get_mut(usize::from(owner))
            .and_then(|table| table.get_mut(index))
            .ok_or(GameError::InvalidEntity(EntityRef::ship(owner, index)))
    }

    /// Look up a planet.
    pub fn planet(&self, index: PlanetIndex) -> Result<&Planet> {
        self.planets
            .get(index)
            .ok_or(GameError::InvalidEntity(EntityRef::planet(index)))
    }

    /// Look up a planet mutably.
    pub fn planet_mut(&mut self, index: PlanetIndex) -> Result<&mut Planet> {
        self.planets
            .get_mut(index)
            .ok_or(GameError::InvalidEntity(EntityRef::planet(index)))
    }

    /// Look up any entity through its reference.
    pub fn entity(&self, entity: EntityRef) -> Result<&dyn Entity> {
        let found: &dyn Entity = match entity {
            EntityRef::Ship { owner, index } => self.ship(owner, index)?,
            EntityRef::Planet { index } => self.planet(index)?,
            EntityRef::Invalid => return Err(GameError::InvalidEntity(entity)),
        };
        Ok(found)
    }

    /// Look up any entity mutably through its reference.
    pub fn entity_mut(&mut self, entity: EntityRef) -> Result<&mut dyn Entity> {
        let found: &mut dyn Entity = match entity {
            EntityRef::Ship { owner, index } => self.ship_mut(owner, index)?,
            EntityRef::Planet { index } => self.planet_mut(index)?,
            EntityRef::Invalid => return Err(GameError::InvalidEntity(entity)),
        };
        Ok(found)
    }

    /// Add a ship to a player's table, returning its slot.
    pub fn add_ship(&mut self, owner: PlayerId, ship: Ship) -> Result<ShipIndex> {
        let table = self
            .ships
            .get_mut(usize::from(owner))
            .ok_or(GameError::InvalidEntity(EntityRef::ship(owner, 0)))?;
        table.push(ship);
        Ok(table.len() - 1)
    }

    /// Add a planet, returning its index.
    pub fn add_planet(&mut self, planet: Planet) -> PlanetIndex {
        self.planets.push(planet);
        self.planets.len() - 1
    }

    /// References to every alive ship, in (player, slot) order.
    #[must_use]
    pub fn alive_ship_refs(&self) -> Vec<EntityRef> {
        self.ships
            .iter()
            .enumerate()
            .flat_map(|(owner, table)| {
                table
                    .iter()
                    .enumerate()
                    .filter(|(_, ship)| ship.is_alive())
                    .map(move |(index, _)| EntityRef::ship(owner as PlayerId, index))
            })
            .collect()
    }

    /// Number of alive ships across all players.
    #[must_use]
    pub fn alive_ship_count(&self) -> usize {
        self.ships
            .iter()
            .flatten()
            .filter(|ship| ship.is_alive())
            .count()
    }

    /// Number of alive ships a player controls.
    #[must_use]
    pub fn player_ship_count(&self, player: PlayerId) -> usize {
        self.ships
            .get(usize::from(player))
            .map_or(0, |table| table.iter().filter(|s| s.is_alive()).count())
    }

    /// Summed health of a player's alive ships.
    #[must_use]
    pub fn player_health_total(&self, player: PlayerId) -> u32 {
        self.ships.get(usize::from(player)).map_or(0, |table| {
            table.iter().map(|s| u32::from(s.health)).sum()
        })
    }

    /// Whether a player still has any alive ship.
    #[must_use]
    pub fn player_has_ships(&self, player: PlayerId) -> bool {
        self.player_ship_count(player) > 0
    }

    /// Clamp a location into the map bounds.
    #[must_use]
    pub fn clamp_to_map(&self, location: Location) -> (Location, bool) {
        let max_x = Fixed::from_num(self.width) - Fixed::DELTA;
        let max_y = Fixed::from_num(self.height) - Fixed::DELTA;
        let x = location.x.clamp(Fixed::ZERO, max_x);
        let y = location.y.clamp(Fixed::ZERO, max_y);
        let clamped = x != location.x || y != location.y;
        (Location::new(x, y), clamped)
    }

    /// Whether a location lies inside the map.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        location.x >= Fixed::ZERO
            && location.y >= Fixed::ZERO
            && location.x < Fixed::from_num(self.width)
            && location.y < Fixed::from_num(self.height)
    }

    /// Hash of the full state, used to compare runs and verify replays.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the world for replays or determinism checks.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize world: {e}")))
    }

    /// Deserialize a world from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize world: {e}")))
    }
}
