//! Whole-turn properties of the resolver.
//!
//! Random worlds and commands from `halite_test_utils::strategies` exercise
//! the guarantees every resolved turn must keep; the scenario tests walk
//! through eliminations and planet destruction across several turns.

use halite_core::prelude::*;
use halite_core::resolver::check_invariants;
use halite_test_utils::determinism::strategies::{arb_turn_moves, arb_world};
use halite_test_utils::fixtures::{turn_moves, WorldBuilder};
use halite_test_utils::proptest::prelude::*;

fn health_of(world: &World) -> Vec<Vec<u16>> {
    world
        .ships
        .iter()
        .map(|table| table.iter().map(|s| s.health).collect())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Ships only appear through production.
    #[test]
    fn prop_alive_ships_only_grow_by_spawning(
        world in arb_world(3, 6, 5),
        moves in arb_turn_moves(3, 6, 5),
    ) {
        let mut world = world;
        let before = world.alive_ship_count();
        let outcome = resolve_turn(&mut world, &moves, &GameConstants::default(), 1).unwrap();
        prop_assert!(world.alive_ship_count() <= before + outcome.events.spawned.len());
    }

    /// Nothing heals during a turn.
    #[test]
    fn prop_health_never_increases(
        world in arb_world(2, 8, 6),
        moves in arb_turn_moves(2, 8, 6),
    ) {
        let mut world = world;
        let ships_before = health_of(&world);
        let planets_before: Vec<u16> = world.planets.iter().map(|p| p.health).collect();

        resolve_turn(&mut world, &moves, &GameConstants::default(), 1).unwrap();

        for (player, table) in ships_before.iter().enumerate() {
            for (slot, &health) in table.iter().enumerate() {
                prop_assert!(world.ships[player][slot].health <= health);
            }
        }
        for (planet, &health) in world.planets.iter().zip(&planets_before) {
            prop_assert!(planet.health <= health);
        }
    }

    /// Docking bookkeeping stays consistent over several turns.
    #[test]
    fn prop_docking_state_stays_bounded(
        world in arb_world(2, 5, 6),
        turns in prop::collection::vec(arb_turn_moves(2, 5, 6), 1..8),
    ) {
        let constants = GameConstants::default();
        let mut world = world;
        for (index, moves) in turns.iter().enumerate() {
            let before = world.clone();
            resolve_turn(&mut world, moves, &constants, index as u32 + 1).unwrap();

            for planet in &world.planets {
                prop_assert!(planet.docked_ships.len() <= usize::from(planet.docking_spots));
            }
            for (player, table) in world.ships.iter().enumerate() {
                for (slot, ship) in table.iter().enumerate() {
                    prop_assert!(ship.docking_progress <= constants.dock_turns);
                    let Some(old) = before.ships[player].get(slot) else { continue };
                    if old.docking_status == DockingStatus::Undocking
                        && ship.docking_status == DockingStatus::Undocking
                    {
                        prop_assert!(ship.docking_progress < old.docking_progress);
                    }
                    if old.docking_status == DockingStatus::Docking
                        && ship.docking_status == DockingStatus::Docking
                    {
                        prop_assert!(ship.docking_progress > old.docking_progress);
                    }
                }
            }
            prop_assert!(check_invariants(&world, &constants, 0).is_ok());
        }
    }

    /// The same input always yields byte-identical worlds.
    #[test]
    fn prop_resolution_is_byte_identical(
        world in arb_world(3, 4, 4),
        moves in arb_turn_moves(3, 4, 4),
    ) {
        let constants = GameConstants::default();
        let mut a = world.clone();
        let mut b = world;
        let outcome_a = resolve_turn(&mut a, &moves, &constants, 1).unwrap();
        let outcome_b = resolve_turn(&mut b, &moves, &constants, 1).unwrap();
        prop_assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
        prop_assert_eq!(outcome_a, outcome_b);
    }
}

#[test]
fn eliminated_players_rank_by_last_frame_alive() {
    let constants = GameConstants {
        weapon_damage: 200,
        ..GameConstants::default()
    };
    let mut world = WorldBuilder::new(60, 40, 3)
        .ship(0, 10.0, 20.0, 0)
        .ship(1, 20.0, 20.0, 180)
        .ship(1, 20.0, 35.0, 0)
        .ship(2, 50.0, 5.0, 90)
        .build();
    let mut stats = MatchStats::new(3);
    stats.observe_turn(&world, 0);

    // Turn 1: player 1 loses one ship in a head-on crash with player 0.
    let moves = turn_moves(3, &[(0, 0, Move::Thrust(7)), (1, 0, Move::Thrust(7))]);
    resolve_turn(&mut world, &moves, &constants, 1).unwrap();
    for player in world.players().collect::<Vec<_>>() {
        if stats.is_alive(player) && !world.player_has_ships(player) {
            kill_player(&mut world, &mut stats, player, 1).unwrap();
        }
    }
    stats.observe_turn(&world, 1);

    assert_eq!(stats.alive_players(), vec![1, 2]);
    assert_eq!(stats.player(0).unwrap().last_frame_alive, 1);
    // Player 0 keeps the fleet size it had before its last turn.
    assert_eq!(stats.player(0).unwrap().last_ship_count, 1);

    // Turn 2: player 2 times out and is removed before resolution.
    kill_player(&mut world, &mut stats, 2, 2).unwrap();
    resolve_turn(&mut world, &[], &constants, 2).unwrap();
    stats.observe_turn(&world, 2);

    assert_eq!(stats.rankings(), vec![1, 2, 0]);
    let result = stats.finalize(&["a".into(), "b".into(), "c".into()], None, Vec::new());
    let ranks: Vec<u32> = result.player_statistics.iter().map(|p| p.rank).collect();
    assert_eq!(ranks, vec![3, 1, 2]);
}

#[test]
fn planet_destruction_releases_owner_and_damages_neighbours() {
    let mut world = WorldBuilder::new(100, 60, 2)
        .planet(50.0, 30.0, 4)
        .ship(1, 55.0, 30.0, 0)
        .ship(1, 45.0, 30.0, 0)
        .ship(0, 50.0, 20.0, 90)
        .docked(1, 0, 0)
        .docked(1, 1, 0)
        .build();
    world.planet_mut(0).unwrap().health = 150;
    let constants = GameConstants::default();

    // Two rams at 100 each bring the planet down on turn 2.
    let ram = turn_moves(2, &[(0, 0, Move::Thrust(7))]);
    resolve_turn(&mut world, &ram, &constants, 1).unwrap();
    assert_eq!(world.planet(0).unwrap().health, 50);
    assert_eq!(world.planet(0).unwrap().owner, Some(1));
    assert_eq!(world.ship(0, 0).unwrap().health, 200);

    let outcome = resolve_turn(&mut world, &ram, &constants, 2).unwrap();
    assert_eq!(outcome.events.explosions, vec![0]);
    assert!(!world.ship(0, 0).unwrap().is_alive());

    let planet = world.planet(0).unwrap();
    assert!(!planet.is_alive());
    assert_eq!(planet.owner, None);
    assert!(planet.docked_ships.is_empty());
    // Docked ships one unit above the surface take 250 * 3 / 4.
    for slot in 0..2 {
        let ship = world.ship(1, slot).unwrap();
        assert_eq!(ship.health, 200 - 187);
        assert!(ship.is_undocked());
    }
    assert!(check_invariants(&world, &constants, 2).is_ok());

    // A destroyed planet can never be docked again.
    let dock = turn_moves(2, &[(1, 0, Move::Dock(0))]);
    let outcome = resolve_turn(&mut world, &dock, &constants, 3).unwrap();
    assert_eq!(outcome.validated[1][&0], Move::Error);
}
