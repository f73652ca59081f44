//! Seeded starting layouts.
//!
//! Generates a [`World`] with:
//! - Rotationally symmetric spawn points, one per player
//! - A small fleet of ships at each spawn
//! - Planet groups replicated around the map centre for every player
//!
//! Layout quality is secondary; determinism per seed is not.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Planet, PlayerId, Ship};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::rules::MAX_PLAYERS;
use crate::world::World;

/// Smallest side length a generated map may have.
const MIN_MAP_SIDE: u16 = 40;

/// Map configuration for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map width in units.
    pub width: u16,
    /// Map height in units.
    pub height: u16,
    /// Number of players.
    pub players: usize,
    /// Starting ships per player.
    pub ships_per_player: usize,
    /// Planet groups; each group places one planet per player.
    pub planet_groups: usize,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 160,
            players: 2,
            ships_per_player: 3,
            planet_groups: 4,
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// Create a small map (96x64).
    #[must_use]
    pub fn small() -> Self {
        Self {
            width: 96,
            height: 64,
            planet_groups: 2,
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of players.
    #[must_use]
    pub const fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }
}

/// Simple deterministic RNG for map generation.
struct MapRng {
    state: u64,
}

impl MapRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // Low bits of an LCG cycle quickly; use the high half.
        self.state >> 32
    }

    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        let range = (max - min) as u64;
        if range == 0 {
            return min;
        }
        min + (self.next() % range) as i32
    }
}

/// Generate a starting world.
pub fn generate_map(config: &MapConfig) -> Result<World> {
    if config.players == 0 || config.players > MAX_PLAYERS {
        return Err(GameError::Config(format!(
            "player count must be between 1 and {MAX_PLAYERS}, got {}",
            config.players
        )));
    }
    if config.width < MIN_MAP_SIDE || config.height < MIN_MAP_SIDE {
        return Err(GameError::Config(format!(
            "map must be at least {MIN_MAP_SIDE}x{MIN_MAP_SIDE}"
        )));
    }

    let mut rng = MapRng::new(config.seed);
    let mut world = World::new(config.width, config.height, config.players);
    let centre = Vec2Fixed::from_ints(i32::from(config.width) / 2, i32::from(config.height) / 2);
    let short_side = i32::from(config.width.min(config.height));
    let sector = 360 / config.players as i32;
    let base_angle = rng.next_range(0, 360);

    let spawns: Vec<Vec2Fixed> = (0..config.players as i32)
        .map(|p| {
            let heading = Vec2Fixed::from_heading(base_angle + p * sector);
            centre + heading.scale(Fixed::from_num(short_side * 3 / 8))
        })
        .collect();

    for (player, &spawn) in spawns.iter().enumerate() {
        for i in 0..config.ships_per_player as i32 {
            let offset = Vec2Fixed::from_ints(0, 2 * i - config.ships_per_player as i32 + 1);
            let (location, _) = world.clamp_to_map(spawn + offset);
            world.add_ship(player as PlayerId, Ship::new(location, 0))?;
        }
    }

    if config.players > 1 && rng.next_range(0, 2) == 0 {
        let radius = rng.next_range(3, 7) as u16;
        world.add_planet(Planet::new(centre, radius));
    }

    for _ in 0..config.planet_groups {
        place_planet_group(&mut world, &mut rng, centre, short_side, sector, &spawns);
    }

    debug!(
        seed = config.seed,
        players = config.players,
        planets = world.planets.len(),
        "Map generated"
    );
    Ok(world)
}

/// Try random positions until one can be copied for every player without
/// overlapping anything. Gives up quietly after a bounded number of attempts.
fn place_planet_group(
    world: &mut World,
    rng: &mut MapRng,
    centre: Vec2Fixed,
    short_side: i32,
    sector: i32,
    spawns: &[Vec2Fixed],
) {
    for _ in 0..64 {
        let radius = rng.next_range(3, 9) as u16;
        let distance = Fixed::from_num(rng.next_range(short_side / 8, short_side / 2));
        let angle = rng.next_range(0, 360);

        let copies: Vec<Vec2Fixed> = (0..spawns.len() as i32)
            .map(|p| centre + Vec2Fixed::from_heading(angle + p * sector).scale(distance))
            .collect();

        let r = Fixed::from_num(radius);
        let margin = r + Fixed::from_num(2);
        let fits = copies.iter().enumerate().all(|(i, &spot)| {
            let inside = spot.x >= margin
                && spot.y >= margin
                && spot.x + margin <= Fixed::from_num(world.width)
                && spot.y + margin <= Fixed::from_num(world.height);
            let clear_of_planets = world.planets.iter().all(|p| {
                let gap = p.radius_fixed() + r + Fixed::from_num(3);
                p.location.distance_squared(spot) > gap * gap
            });
            let clear_of_copies = copies[..i].iter().all(|&other| {
                let gap = r + r + Fixed::from_num(3);
                other.distance_squared(spot) > gap * gap
            });
            let clear_of_spawns = spawns.iter().all(|&s| {
                let gap = r + Fixed::from_num(8);
                s.distance_squared(spot) > gap * gap
            });
            inside && clear_of_planets && clear_of_copies && clear_of_spawns
        });

        if fits {
            for spot in copies {
                world.add_planet(Planet::new(spot, radius));
            }
            return;
        }
    }
}
