//! Turn resolution.
//!
//! [`resolve_turn`] advances a [`World`] by exactly one turn:
//!
//! 1. Validate and apply commands (player ascending, ship slot ascending).
//! 2. Move ships over `substeps` sub-steps, detecting contacts after every
//!    sub-step and applying damage immediately.
//! 3. Advance docking transitions.
//! 4. Run planet production and spawn ships.
//! 5. Check structural invariants.
//!
//! Everything is integer/fixed-point and iterates ordered collections, so the
//! same world and commands always produce the same bytes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::collision::{CollisionMap, MovementDeltas};
use crate::entity::{
    DockingStatus, Entity, EntityRef, Location, Planet, PlanetIndex, PlayerId, Ship, ShipIndex,
};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::moves::{Move, PlayerMoves, TurnMoves};
use crate::rules::GameConstants;
use crate::stats::MatchStats;
use crate::world::World;

/// Why a command was turned into [`Move::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The slot does not exist or the ship is dead.
    NoSuchShip,
    /// Rotate or thrust while not undocked.
    NotUndocked,
    /// Undock while not fully docked.
    NotDocked,
    /// The target planet does not exist.
    NoSuchPlanet,
    /// The target planet has been destroyed.
    PlanetDestroyed,
    /// The target planet belongs to another player.
    PlanetOwnedByOther,
    /// Every docking spot is taken.
    NoFreeSpot,
    /// The ship is too far from the planet surface.
    OutOfRange,
}

/// A command that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRejected {
    /// Issuing player.
    pub player: PlayerId,
    /// Target ship slot.
    pub ship: ShipIndex,
    /// Command as received.
    pub original: Move,
    /// Why it was rejected.
    pub reason: RejectReason,
}

/// Health removed from an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Sub-step of the hit; 0 outside the motion phase.
    pub substep: u32,
    /// What dealt the damage.
    pub source: EntityRef,
    /// What took the damage.
    pub target: EntityRef,
    /// Health actually removed.
    pub amount: u16,
}

/// A ship finishing a docking or undocking transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockEvent {
    /// Owner of the ship.
    pub player: PlayerId,
    /// Ship slot.
    pub ship: ShipIndex,
    /// Planet involved.
    pub planet: PlanetIndex,
}

/// Everything notable that happened during one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvents {
    /// Commands turned into errors.
    pub rejected: Vec<MoveRejected>,
    /// Damage dealt, in application order.
    pub damage: Vec<DamageEvent>,
    /// Entities destroyed, in order of death.
    pub deaths: Vec<EntityRef>,
    /// Planets that exploded.
    pub explosions: Vec<PlanetIndex>,
    /// Ships that became fully docked.
    pub docked: Vec<DockEvent>,
    /// Ships that finished undocking.
    pub undocked: Vec<DockEvent>,
    /// Ships produced by planets.
    pub spawned: Vec<DockEvent>,
}

/// Result of resolving one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Commands after validation, one table per player.
    pub validated: TurnMoves,
    /// Events of the turn.
    pub events: TurnEvents,
}

/// Advance the world by one turn.
///
/// `moves` holds at most one table per player; missing tables and missing
/// ships mean [`Move::Noop`]. Returns an error only for broken invariants,
/// never for bad commands.
pub fn resolve_turn(
    world: &mut World,
    moves: &[PlayerMoves],
    constants: &GameConstants,
    turn: u32,
) -> Result<TurnOutcome> {
    if moves.len() > world.player_count() {
        return Err(GameError::invariant(
            turn,
            format!(
                "{} command tables for {} players",
                moves.len(),
                world.player_count()
            ),
        ));
    }

    let mut resolver = Resolver {
        world,
        constants,
        turn,
        substep: 0,
        events: TurnEvents::default(),
    };

    let (validated, velocities) = resolver.apply_moves(moves)?;
    resolver.integrate_motion(velocities)?;
    resolver.advance_docking()?;
    resolver.produce_ships()?;

    let Resolver { world, events, .. } = resolver;
    check_invariants(world, constants, turn)?;

    #[cfg(debug_assertions)]
    debug!(turn, hash = world.state_hash(), "Turn resolved");

    Ok(TurnOutcome { validated, events })
}

/// Remove a player from the match.
///
/// Every remaining ship is destroyed without damage accounting and its docking
/// slot released. The elimination is recorded against `turn`. A player whose
/// fleet is already gone keeps the ship count and health of its last observed
/// turn for tie-breaking.
pub fn kill_player(
    world: &mut World,
    stats: &mut MatchStats,
    player: PlayerId,
    turn: u32,
) -> Result<()> {
    let (ship_count, health_total) = if world.player_has_ships(player) {
        (
            world.player_ship_count(player) as u32,
            world.player_health_total(player),
        )
    } else {
        stats.player(player).map_or((0, 0), |record| {
            (record.last_ship_count, record.last_ship_health_total)
        })
    };

    if stats.record_elimination(player, turn, ship_count, health_total) {
        info!(player, turn, ship_count, "Player eliminated");
    }

    let slots = world.ships.get(usize::from(player)).map_or(0, Vec::len);
    for index in 0..slots {
        if world.ship(player, index)?.is_alive() {
            destroy_ship(world, player, index)?;
        }
    }
    Ok(())
}

/// Damage a ship takes from a planet exploding at `location`.
///
/// Full damage at or inside the surface, falling off linearly to zero at the
/// explosion radius.
#[must_use]
pub fn compute_planet_explosion_damage(
    planet: &Planet,
    location: Location,
    constants: &GameConstants,
) -> u16 {
    let distance = planet.location.distance(location);
    let surface = planet.radius_fixed();
    let reach = surface * constants.explosion_radius_factor_fixed();
    if distance <= surface {
        constants.explosion_damage
    } else if distance >= reach {
        0
    } else {
        let full = Fixed::from_num(constants.explosion_damage);
        (full * (reach - distance) / (reach - surface)).to_num::<u16>()
    }
}

/// First free spawn point on the ring around a planet.
#[must_use]
pub fn find_spawn_location(
    world: &World,
    planet: &Planet,
    constants: &GameConstants,
) -> Option<Location> {
    let ship_radius = constants.ship_radius_fixed();
    let ring = planet.radius_fixed() + constants.spawn_offset_fixed();
    let min_gap = (ship_radius + ship_radius) * (ship_radius + ship_radius);

    (0..360).step_by(30).find_map(|angle| {
        let spot = planet.location + Vec2Fixed::from_heading(angle).scale(ring);
        if !world.contains(spot) {
            return None;
        }
        let ship_blocked = world
            .ships
            .iter()
            .flatten()
            .any(|s| s.is_alive() && s.location.distance_squared(spot) <= min_gap);
        let planet_blocked = world.planets.iter().any(|p| {
            let reach = p.radius_fixed() + ship_radius;
            p.is_alive() && p.location.distance_squared(spot) <= reach * reach
        });
        (!ship_blocked && !planet_blocked).then_some(spot)
    })
}

/// Verify the docking bookkeeping of the whole world.
pub fn check_invariants(world: &World, constants: &GameConstants, turn: u32) -> Result<()> {
    for (index, planet) in world.planets.iter().enumerate() {
        if planet.docked_ships.len() > usize::from(planet.docking_spots) {
            return Err(GameError::invariant(
                turn,
                format!("planet {index} holds more ships than spots"),
            ));
        }
        if !planet.is_alive() && (planet.owner.is_some() || !planet.docked_ships.is_empty()) {
            return Err(GameError::invariant(
                turn,
                format!("destroyed planet {index} still owned or docked"),
            ));
        }
        if planet.docked_ships.is_empty() {
            continue;
        }
        let Some(owner) = planet.owner else {
            return Err(GameError::invariant(
                turn,
                format!("planet {index} has docked ships but no owner"),
            ));
        };
        for &slot in &planet.docked_ships {
            let ship = world
                .ship(owner, slot)
                .map_err(|_| GameError::invariant(turn, format!("planet {index} lists missing ship {slot}")))?;
            if !ship.is_alive() || ship.docked_planet != Some(index) {
                return Err(GameError::invariant(
                    turn,
                    format!("planet {index} lists ship {owner}/{slot} which is not attached"),
                ));
            }
        }
    }

    for (owner, table) in world.ships.iter().enumerate() {
        for (slot, ship) in table.iter().enumerate() {
            if ship.docking_progress > constants.dock_turns {
                return Err(GameError::invariant(
                    turn,
                    format!("ship {owner}/{slot} docking progress out of range"),
                ));
            }
            if ship.is_undocked() {
                if ship.docking_progress != 0 || ship.docked_planet.is_some() {
                    return Err(GameError::invariant(
                        turn,
                        format!("undocked ship {owner}/{slot} carries docking state"),
                    ));
                }
                continue;
            }
            let attached = ship
                .docked_planet
                .and_then(|p| world.planets.get(p))
                .is_some_and(|p| p.owner == Some(owner as PlayerId) && p.docked_ships.contains(&slot));
            if !ship.is_alive() || !attached {
                return Err(GameError::invariant(
                    turn,
                    format!("ship {owner}/{slot} is docking but not listed by its planet"),
                ));
            }
        }
    }
    Ok(())
}

/// Kill a ship and release its docking slot.
fn destroy_ship(world: &mut World, owner: PlayerId, index: ShipIndex) -> Result<()> {
    let ship = world.ship_mut(owner, index)?;
    let planet = ship.docked_planet;
    ship.reset_docking_status();
    ship.kill();
    if let Some(planet) = planet {
        world.planet_mut(planet)?.release_ship(index);
    }
    Ok(())
}

type Velocities = BTreeMap<EntityRef, Vec2Fixed>;

struct Resolver<'w> {
    world: &'w mut World,
    constants: &'w GameConstants,
    turn: u32,
    substep: u32,
    events: TurnEvents,
}

impl Resolver<'_> {
    /// Validate every command and apply its immediate effect.
    ///
    /// Returns the validated commands and the per-sub-step displacement of
    /// every thrusting ship.
    fn apply_moves(&mut self, moves: &[PlayerMoves]) -> Result<(TurnMoves, Velocities)> {
        let mut validated = vec![PlayerMoves::new(); self.world.player_count()];
        let mut velocities = Velocities::new();

        for (player, table) in moves.iter().enumerate() {
            let player = player as PlayerId;
            for (&index, &original) in table {
                let accepted = match self.validate_move(player, index, original) {
                    Ok(accepted) => accepted,
                    Err(reason) => {
                        trace!(player, ship = index, ?original, ?reason, "Command rejected");
                        self.events.rejected.push(MoveRejected {
                            player,
                            ship: index,
                            original,
                            reason,
                        });
                        validated[usize::from(player)].insert(index, Move::Error);
                        continue;
                    }
                };

                match accepted {
                    Move::Rotate(degrees) => {
                        let ship = self.world.ship_mut(player, index)?;
                        let heading = (i32::from(ship.orientation) + i32::from(degrees)).rem_euclid(360);
                        ship.orientation = heading as u16;
                    }
                    Move::Thrust(magnitude) if magnitude > 0 => {
                        let ship = self.world.ship(player, index)?;
                        let step = Vec2Fixed::from_heading(i32::from(ship.orientation))
                            .scale(Fixed::from_num(magnitude))
                            .div(Fixed::from_num(self.constants.substeps));
                        velocities.insert(EntityRef::ship(player, index), step);
                    }
                    Move::Dock(planet) => {
                        let ship = self.world.ship_mut(player, index)?;
                        ship.docking_status = DockingStatus::Docking;
                        ship.docking_progress = 0;
                        ship.docked_planet = Some(planet);
                        let planet = self.world.planet_mut(planet)?;
                        planet.docked_ships.push(index);
                        if planet.owner.is_none() {
                            planet.owner = Some(player);
                        }
                    }
                    Move::Undock => {
                        let ship = self.world.ship_mut(player, index)?;
                        ship.docking_status = DockingStatus::Undocking;
                        ship.docking_progress = self.constants.dock_turns;
                    }
                    Move::Thrust(_) | Move::Noop | Move::Error => {}
                }
                validated[usize::from(player)].insert(index, accepted);
            }
        }

        Ok((validated, velocities))
    }

    /// Check one command against the current world, returning it clamped.
    fn validate_move(
        &self,
        player: PlayerId,
        index: ShipIndex,
        original: Move,
    ) -> std::result::Result<Move, RejectReason> {
        let ship = self
            .world
            .ship(player, index)
            .ok()
            .filter(|ship| ship.is_alive())
            .ok_or(RejectReason::NoSuchShip)?;

        let c = self.constants;
        match original {
            Move::Noop | Move::Error => Ok(original),
            Move::Rotate(_) | Move::Thrust(_) if !ship.is_undocked() => Err(RejectReason::NotUndocked),
            Move::Rotate(degrees) => Ok(Move::Rotate(degrees.clamp(-c.max_rotation, c.max_rotation))),
            Move::Thrust(magnitude) => Ok(Move::Thrust(magnitude.clamp(0, c.max_thrust))),
            Move::Undock if ship.docking_status != DockingStatus::Docked => Err(RejectReason::NotDocked),
            Move::Undock => Ok(Move::Undock),
            Move::Dock(target) => Self::validate_dock(ship, player, self.world.planets.get(target), c)
                .map(|()| Move::Dock(target)),
        }
    }

    fn validate_dock(
        ship: &Ship,
        player: PlayerId,
        planet: Option<&Planet>,
        constants: &GameConstants,
    ) -> std::result::Result<(), RejectReason> {
        let planet = planet.ok_or(RejectReason::NoSuchPlanet)?;
        if !ship.is_undocked() {
            return Err(RejectReason::NotUndocked);
        }
        if !planet.is_alive() {
            return Err(RejectReason::PlanetDestroyed);
        }
        if planet.owner.is_some_and(|owner| owner != player) {
            return Err(RejectReason::PlanetOwnedByOther);
        }
        if !planet.has_free_spot() {
            return Err(RejectReason::NoFreeSpot);
        }
        let gap = ship.location.distance(planet.location) - planet.radius_fixed();
        if gap > constants.dock_radius_fixed() {
            return Err(RejectReason::OutOfRange);
        }
        Ok(())
    }

    /// Move ships sub-step by sub-step, resolving contacts as they happen.
    fn integrate_motion(&mut self, mut velocities: Velocities) -> Result<()> {
        let substeps = self.constants.substeps;
        let mut deltas = MovementDeltas::new(substeps);
        let mut resolved: BTreeSet<(EntityRef, EntityRef)> = BTreeSet::new();

        for substep in 1..=substeps {
            if velocities.is_empty() {
                break;
            }
            self.substep = substep;

            let mut stopped = Vec::new();
            for (&entity, &step) in &velocities {
                let EntityRef::Ship { owner, index } = entity else {
                    continue;
                };
                let current = self.world.ship(owner, index)?.location;
                let (next, clamped) = self.world.clamp_to_map(current + step);
                self.world.ship_mut(owner, index)?.location = next;
                deltas.record(entity, substep, next - current);
                if clamped {
                    trace!(turn = self.turn, owner, ship = index, substep, "Ship stopped at map edge");
                    stopped.push(entity);
                }
            }

            let map = CollisionMap::build(
                &*self.world,
                self.constants.collision_cell_size,
                self.constants.ship_radius_fixed(),
            );
            for (a, b) in map.candidate_pairs() {
                if resolved.contains(&(a, b)) || !self.both_alive(a, b)? || !self.in_contact(a, b)? {
                    continue;
                }
                if !deltas.moved(a, substep) && !deltas.moved(b, substep) {
                    continue;
                }
                resolved.insert((a, b));

                let (damage_a, damage_b) = self.compute_damage(a, b, &deltas, substep)?;
                trace!(turn = self.turn, substep, ?a, ?b, damage_a, damage_b, "Contact");
                self.damage_entity(a, damage_a, b)?;
                self.damage_entity(b, damage_b, a)?;

                if let Some(ship) = Self::ship_hitting_planet(a, b) {
                    if self.world.entity(ship)?.is_alive() {
                        self.push_back(ship, &mut deltas, substep)?;
                        stopped.push(ship);
                    }
                }
            }

            for entity in stopped {
                velocities.remove(&entity);
            }
            let world = &*self.world;
            velocities.retain(|&entity, _| world.entity(entity).is_ok_and(|e| e.is_alive()));
        }

        self.substep = 0;
        Ok(())
    }

    fn both_alive(&self, a: EntityRef, b: EntityRef) -> Result<bool> {
        Ok(self.world.entity(a)?.is_alive() && self.world.entity(b)?.is_alive())
    }

    fn in_contact(&self, a: EntityRef, b: EntityRef) -> Result<bool> {
        let ship_radius = self.constants.ship_radius_fixed();
        let reach = match (a, b) {
            (EntityRef::Ship { .. }, EntityRef::Ship { .. }) => ship_radius + ship_radius,
            (EntityRef::Ship { .. }, EntityRef::Planet { index })
            | (EntityRef::Planet { index }, EntityRef::Ship { .. }) => {
                self.world.planet(index)?.radius_fixed() + ship_radius
            }
            _ => return Ok(false),
        };
        let la = self.world.entity(a)?.location();
        let lb = self.world.entity(b)?.location();
        Ok(la.distance_squared(lb) <= reach * reach)
    }

    fn ship_hitting_planet(a: EntityRef, b: EntityRef) -> Option<EntityRef> {
        match (a, b) {
            (ship @ EntityRef::Ship { .. }, EntityRef::Planet { .. })
            | (EntityRef::Planet { .. }, ship @ EntityRef::Ship { .. }) => Some(ship),
            _ => None,
        }
    }

    /// Return a ship to where it was before this sub-step and stop it.
    fn push_back(&mut self, entity: EntityRef, deltas: &mut MovementDeltas, substep: u32) -> Result<()> {
        let EntityRef::Ship { owner, index } = entity else {
            return Err(GameError::InvalidEntity(entity));
        };
        let delta = deltas.delta(entity, substep);
        let ship = self.world.ship_mut(owner, index)?;
        ship.location = ship.location - delta;
        deltas.record(entity, substep, Vec2Fixed::ZERO);
        deltas.truncate_after(entity, substep);
        Ok(())
    }

    /// Damage each side of a contact deals to the other.
    ///
    /// Contacts where neither side moved this sub-step deal nothing.
    fn compute_damage(
        &self,
        a: EntityRef,
        b: EntityRef,
        deltas: &MovementDeltas,
        substep: u32,
    ) -> Result<(u16, u16)> {
        if !a.is_valid() || !b.is_valid() {
            return Err(GameError::InvalidEntity(if a.is_valid() { b } else { a }));
        }
        if !deltas.moved(a, substep) && !deltas.moved(b, substep) {
            return Ok((0, 0));
        }
        let c = self.constants;
        Ok(match (a.is_ship(), b.is_ship()) {
            (true, true) => (c.weapon_damage, c.weapon_damage),
            (true, false) => (0, c.planet_impact_damage),
            (false, true) => (c.planet_impact_damage, 0),
            (false, false) => (0, 0),
        })
    }

    /// Subtract health from an entity, killing it on reaching zero.
    fn damage_entity(&mut self, target: EntityRef, amount: u16, source: EntityRef) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let entity = self.world.entity_mut(target)?;
        if !entity.is_alive() {
            return Ok(());
        }
        let dealt = entity.apply_damage(amount);
        let killed = !entity.is_alive();
        self.events.damage.push(DamageEvent {
            substep: self.substep,
            source,
            target,
            amount: dealt,
        });
        if killed {
            self.kill_entity(target)?;
        }
        Ok(())
    }

    fn kill_entity(&mut self, entity: EntityRef) -> Result<()> {
        debug!(turn = self.turn, substep = self.substep, ?entity, "Entity destroyed");
        self.events.deaths.push(entity);
        match entity {
            EntityRef::Ship { owner, index } => destroy_ship(self.world, owner, index),
            EntityRef::Planet { index } => self.explode_planet(index),
            EntityRef::Invalid => Err(GameError::InvalidEntity(entity)),
        }
    }

    /// Splash damage around a destroyed planet, then clear its state.
    fn explode_planet(&mut self, index: PlanetIndex) -> Result<()> {
        let planet = self.world.planet(index)?.clone();
        self.events.explosions.push(index);

        let reach = planet.radius_fixed() * self.constants.explosion_radius_factor_fixed();
        let victims: Vec<(EntityRef, u16)> = self
            .world
            .alive_ship_refs()
            .into_iter()
            .filter_map(|entity| {
                let location = self.world.entity(entity).ok()?.location();
                (planet.location.distance_squared(location) < reach * reach).then(|| {
                    (
                        entity,
                        compute_planet_explosion_damage(&planet, location, self.constants),
                    )
                })
            })
            .collect();

        for (victim, damage) in victims {
            self.damage_entity(victim, damage, EntityRef::planet(index))?;
        }

        let survivors = std::mem::take(&mut self.world.planet_mut(index)?.docked_ships);
        for slot in survivors {
            if let Some(owner) = planet.owner {
                self.world.ship_mut(owner, slot)?.reset_docking_status();
            }
        }
        let planet = self.world.planet_mut(index)?;
        planet.kill();
        planet.owner = None;
        planet.current_production = 0;
        planet.remaining_production = 0;
        Ok(())
    }

    /// Move docking and undocking ships one turn along their transition.
    fn advance_docking(&mut self) -> Result<()> {
        let dock_turns = self.constants.dock_turns;
        for player in 0..self.world.player_count() {
            let player = player as PlayerId;
            let slots = self.world.ships[usize::from(player)].len();
            for index in 0..slots {
                let ship = self.world.ship_mut(player, index)?;
                if !ship.is_alive() {
                    continue;
                }
                match ship.docking_status {
                    DockingStatus::Docking => {
                        ship.docking_progress += 1;
                        if ship.docking_progress >= dock_turns {
                            ship.docking_status = DockingStatus::Docked;
                            ship.docking_progress = 0;
                            let planet = ship.docked_planet.ok_or_else(|| {
                                GameError::invariant(self.turn, format!("ship {player}/{index} docking nowhere"))
                            })?;
                            self.events.docked.push(DockEvent { player, ship: index, planet });
                        }
                    }
                    DockingStatus::Undocking => {
                        ship.docking_progress = ship.docking_progress.saturating_sub(1);
                        if ship.docking_progress == 0 {
                            let planet = ship.docked_planet;
                            ship.reset_docking_status();
                            if let Some(planet) = planet {
                                self.world.planet_mut(planet)?.release_ship(index);
                                self.events.undocked.push(DockEvent { player, ship: index, planet });
                            }
                        }
                    }
                    DockingStatus::Undocked | DockingStatus::Docked => {}
                }
            }
        }
        Ok(())
    }

    /// Accumulate production on owned planets and spawn ships from it.
    fn produce_ships(&mut self) -> Result<()> {
        let c = self.constants;
        for index in 0..self.world.planets.len() {
            let planet = self.world.planet(index)?;
            let Some(owner) = planet.owner.filter(|_| planet.is_alive()) else {
                continue;
            };
            let docked = planet
                .docked_ships
                .iter()
                .filter(|&&slot| {
                    self.world
                        .ship(owner, slot)
                        .is_ok_and(|s| s.docking_status == DockingStatus::Docked)
                })
                .count() as u16;

            let planet = self.world.planet_mut(index)?;
            let gain = c
                .production_per_docked_ship
                .saturating_mul(docked)
                .min(planet.remaining_production);
            planet.remaining_production -= gain;
            planet.current_production = planet.current_production.saturating_add(gain);

            while self.world.planet(index)?.current_production >= c.production_per_ship {
                if self.world.ships[usize::from(owner)].len() >= c.max_ships_per_player {
                    break;
                }
                let world = &*self.world;
                let Some(spot) = find_spawn_location(world, world.planet(index)?, c) else {
                    break;
                };
                let slot = self.world.add_ship(owner, Ship::new(spot, 0))?;
                self.world.planet_mut(index)?.current_production -= c.production_per_ship;
                debug!(turn = self.turn, player = owner, ship = slot, planet = index, "Ship spawned");
                self.events.spawned.push(DockEvent {
                    player: owner,
                    ship: slot,
                    planet: index,
                });
            }
        }
        Ok(())
    }
}
