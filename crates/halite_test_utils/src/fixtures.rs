//! Test fixtures and helpers.
//!
//! Pre-built worlds and command tables for consistent testing.

use fixed::types::I32F32;
use halite_core::entity::{DockingStatus, Planet, PlanetIndex, PlayerId, Ship, ShipIndex};
use halite_core::math::Vec2Fixed;
use halite_core::moves::{Move, PlayerMoves, TurnMoves};
use halite_core::world::World;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Location from float coordinates.
#[must_use]
pub fn at(x: f64, y: f64) -> Vec2Fixed {
    Vec2Fixed::new(fixed_f(x), fixed_f(y))
}

/// Fluent construction of test worlds.
#[derive(Debug, Clone)]
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    /// Empty map for `players` players.
    #[must_use]
    pub fn new(width: u16, height: u16, players: usize) -> Self {
        Self {
            world: World::new(width, height, players),
        }
    }

    /// Add an undocked ship.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is not a player of the world.
    #[must_use]
    pub fn ship(mut self, owner: PlayerId, x: f64, y: f64, orientation: u16) -> Self {
        self.world
            .add_ship(owner, Ship::new(at(x, y), orientation))
            .expect("fixture ship owner out of range");
        self
    }

    /// Add an unowned planet.
    #[must_use]
    pub fn planet(mut self, x: f64, y: f64, radius: u16) -> Self {
        self.world.add_planet(Planet::new(at(x, y), radius));
        self
    }

    /// Attach an existing ship to an existing planet as fully docked.
    ///
    /// # Panics
    ///
    /// Panics if the ship or planet does not exist.
    #[must_use]
    pub fn docked(mut self, owner: PlayerId, ship: ShipIndex, planet: PlanetIndex) -> Self {
        let s = self.world.ship_mut(owner, ship).expect("fixture ship missing");
        s.docking_status = DockingStatus::Docked;
        s.docking_progress = 0;
        s.docked_planet = Some(planet);
        let p = self.world.planet_mut(planet).expect("fixture planet missing");
        p.docked_ships.push(ship);
        p.owner = Some(owner);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> World {
        self.world
    }
}

/// Two ships flying at each other across an open map, with a planet nearby.
#[must_use]
pub fn duel_world() -> World {
    WorldBuilder::new(80, 60, 2)
        .ship(0, 10.0, 30.0, 0)
        .ship(1, 70.0, 30.0, 180)
        .planet(40.0, 12.0, 4)
        .build()
}

/// A two-player skirmish around three planets, one of them already held.
#[must_use]
pub fn skirmish_world() -> World {
    WorldBuilder::new(120, 80, 2)
        .planet(30.0, 40.0, 5)
        .planet(60.0, 40.0, 3)
        .planet(90.0, 40.0, 5)
        .ship(0, 20.0, 20.0, 0)
        .ship(0, 20.0, 60.0, 0)
        .ship(0, 36.0, 40.0, 0)
        .ship(1, 100.0, 20.0, 180)
        .ship(1, 100.0, 60.0, 180)
        .ship(1, 84.0, 40.0, 180)
        .docked(0, 2, 0)
        .docked(1, 2, 2)
        .build()
}

/// Command tables for `players` players from `(player, ship, move)` entries.
#[must_use]
pub fn turn_moves(players: usize, entries: &[(PlayerId, ShipIndex, Move)]) -> TurnMoves {
    let mut moves = vec![PlayerMoves::new(); players];
    for &(player, ship, mv) in entries {
        if let Some(table) = moves.get_mut(usize::from(player)) {
            table.insert(ship, mv);
        }
    }
    moves
}
