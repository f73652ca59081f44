//! Spatial bucketing and movement history for continuous collision checks.
//!
//! The resolver rebuilds a [`CollisionMap`] after every sub-step so that only
//! entities in neighbouring cells are tested for exact contact. Storage is
//! ordered (`BTreeMap`/`BTreeSet`) so candidate pairs always come out in the
//! same order for the same world.

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::{Entity, EntityRef};
use crate::math::{Fixed, Vec2Fixed};
use crate::world::World;

type Cell = (i32, i32);

/// Uniform grid of cells, each listing the entities that overlap it.
#[derive(Debug, Clone, Default)]
pub struct CollisionMap {
    cell_size: Fixed,
    cells: BTreeMap<Cell, Vec<EntityRef>>,
    ship_cells: Vec<(EntityRef, Cell)>,
}

impl CollisionMap {
    /// Bucket every alive ship and planet of the world.
    ///
    /// Planets are inserted into every cell their disc (grown by
    /// `ship_radius`) overlaps, so a ship touching the planet always finds it
    /// in its own or a neighbouring cell.
    #[must_use]
    pub fn build(world: &World, cell_size: u32, ship_radius: Fixed) -> Self {
        let mut map = Self {
            cell_size: Fixed::from_num(cell_size.max(1)),
            cells: BTreeMap::new(),
            ship_cells: Vec::new(),
        };

        for entity in world.alive_ship_refs() {
            if let EntityRef::Ship { owner, index } = entity {
                if let Ok(ship) = world.ship(owner, index) {
                    let cell = map.cell_of(ship.location);
                    map.cells.entry(cell).or_default().push(entity);
                    map.ship_cells.push((entity, cell));
                }
            }
        }

        for (index, planet) in world.planets.iter().enumerate() {
            if !planet.is_alive() {
                continue;
            }
            let reach = planet.radius_fixed() + ship_radius;
            let min = map.cell_of(planet.location - Vec2Fixed::new(reach, reach));
            let max = map.cell_of(planet.location + Vec2Fixed::new(reach, reach));
            for cx in min.0..=max.0 {
                for cy in min.1..=max.1 {
                    map.cells
                        .entry((cx, cy))
                        .or_default()
                        .push(EntityRef::planet(index));
                }
            }
        }

        map
    }

    fn cell_of(&self, location: Vec2Fixed) -> Cell {
        (
            (location.x / self.cell_size).floor().to_num::<i32>(),
            (location.y / self.cell_size).floor().to_num::<i32>(),
        )
    }

    /// Entities bucketed in a cell.
    #[must_use]
    pub fn entities_in(&self, cell: (i32, i32)) -> &[EntityRef] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every ship/ship and ship/planet pair close enough to be worth an exact
    /// distance test, sorted and without duplicates. Each pair is ordered
    /// `(lower, higher)`.
    #[must_use]
    pub fn candidate_pairs(&self) -> Vec<(EntityRef, EntityRef)> {
        let mut pairs = BTreeSet::new();
        for &(ship, (cx, cy)) in &self.ship_cells {
            for nx in cx - 1..=cx + 1 {
                for ny in cy - 1..=cy + 1 {
                    for &other in self.entities_in((nx, ny)) {
                        if other != ship {
                            pairs.insert(if ship < other { (ship, other) } else { (other, ship) });
                        }
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }
}

/// Per-ship displacement for every sub-step of the current turn.
///
/// Sub-steps are numbered from 1. Entities that never moved have no entry and
/// report a zero displacement.
#[derive(Debug, Clone, Default)]
pub struct MovementDeltas {
    substeps: u32,
    deltas: BTreeMap<EntityRef, Vec<Vec2Fixed>>,
}

impl MovementDeltas {
    /// History for a turn of `substeps` sub-steps.
    #[must_use]
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps,
            deltas: BTreeMap::new(),
        }
    }

    /// Record how far an entity moved during a sub-step.
    pub fn record(&mut self, entity: EntityRef, substep: u32, delta: Vec2Fixed) {
        if substep == 0 || substep > self.substeps {
            return;
        }
        let slots = self.substeps as usize;
        let history = self
            .deltas
            .entry(entity)
            .or_insert_with(|| vec![Vec2Fixed::ZERO; slots]);
        history[(substep - 1) as usize] = delta;
    }

    /// Displacement of an entity during a sub-step.
    #[must_use]
    pub fn delta(&self, entity: EntityRef, substep: u32) -> Vec2Fixed {
        if substep == 0 {
            return Vec2Fixed::ZERO;
        }
        self.deltas
            .get(&entity)
            .and_then(|history| history.get((substep - 1) as usize))
            .copied()
            .unwrap_or(Vec2Fixed::ZERO)
    }

    /// Whether an entity moved during a sub-step.
    #[must_use]
    pub fn moved(&self, entity: EntityRef, substep: u32) -> bool {
        !self.delta(entity, substep).is_zero()
    }

    /// Drop the remaining motion of an entity after `substep`.
    pub fn truncate_after(&mut self, entity: EntityRef, substep: u32) {
        if let Some(history) = self.deltas.get_mut(&entity) {
            for slot in history.iter_mut().skip(substep as usize) {
                *slot = Vec2Fixed::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Planet, Ship};

    fn world_with(ships: &[(u8, i32, i32)], planets: &[(i32, i32, u16)]) -> World {
        let mut world = World::new(100, 100, 2);
        for &(owner, x, y) in ships {
            world
                .add_ship(owner, Ship::new(Vec2Fixed::from_ints(x, y), 0))
                .unwrap();
        }
        for &(x, y, r) in planets {
            world.add_planet(Planet::new(Vec2Fixed::from_ints(x, y), r));
        }
        world
    }

    #[test]
    fn test_neighbouring_cells_are_candidates() {
        // Ships straddle a cell border at x = 8.
        let world = world_with(&[(0, 7, 4), (1, 8, 4)], &[]);
        let map = CollisionMap::build(&world, 8, Fixed::from_num(0.5));
        assert_eq!(
            map.candidate_pairs(),
            vec![(EntityRef::ship(0, 0), EntityRef::ship(1, 0))]
        );
    }

    #[test]
    fn test_distant_ships_are_not_candidates() {
        let world = world_with(&[(0, 2, 2), (1, 60, 60)], &[]);
        let map = CollisionMap::build(&world, 8, Fixed::from_num(0.5));
        assert!(map.candidate_pairs().is_empty());
    }

    #[test]
    fn test_planet_spans_cells() {
        let world = world_with(&[(0, 40, 26)], &[(40, 40, 12)]);
        let map = CollisionMap::build(&world, 8, Fixed::from_num(0.5));
        assert!(map.entities_in((5, 3)).contains(&EntityRef::planet(0)));
        assert_eq!(
            map.candidate_pairs(),
            vec![(EntityRef::ship(0, 0), EntityRef::planet(0))]
        );
    }

    #[test]
    fn test_dead_entities_are_skipped() {
        let mut world = world_with(&[(0, 7, 4), (1, 8, 4)], &[]);
        world.ship_mut(1, 0).unwrap().kill();
        let map = CollisionMap::build(&world, 8, Fixed::from_num(0.5));
        assert!(map.candidate_pairs().is_empty());
    }

    #[test]
    fn test_deltas_history() {
        let ship = EntityRef::ship(0, 0);
        let mut deltas = MovementDeltas::new(4);
        deltas.record(ship, 1, Vec2Fixed::from_ints(1, 0));
        deltas.record(ship, 2, Vec2Fixed::from_ints(1, 0));
        deltas.record(ship, 9, Vec2Fixed::from_ints(5, 5));

        assert!(deltas.moved(ship, 2));
        assert!(!deltas.moved(ship, 3));
        assert!(!deltas.moved(EntityRef::ship(1, 0), 1));
        assert_eq!(deltas.delta(ship, 2), Vec2Fixed::from_ints(1, 0));

        deltas.truncate_after(ship, 1);
        assert!(deltas.moved(ship, 1));
        assert!(!deltas.moved(ship, 2));
    }
}
