//! Determinism testing utilities.
//!
//! Provides a harness for verifying that turn resolution produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays are verified by re-resolving recorded turns, so resolution must
//! be 100% deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`halite_core::math::Fixed`] throughout,
//!   including the trigonometry used for headings.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Collision cells and candidate pairs live in ordered maps and sets.
//!
//! - **System randomness**: Map generation uses a seeded LCG only.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual resolver phases (motion, damage, docking)
//! 2. **Property tests**: Random worlds and commands still resolve identically
//! 3. **Integration tests**: Whole recorded matches verify on playback
//! 4. **Parallel tests**: Running N resolutions on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use halite_core::moves::TurnMoves;
use halite_core::resolver::resolve_turn;
use halite_core::rules::GameConstants;
use halite_core::world::World;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns resolved.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic resolution).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert all runs matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Resolution is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one turn (receives the turn number)
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use halite_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,  // Run 5 times
///     100, // 100 turns each
///     || duel_world(),
///     |world, turn| { resolve_turn(world, &[], &constants, turn).unwrap(); },
///     World::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u32),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for turn in 1..=turns {
            step(&mut state, turn);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Resolve `turns` turns of a world several times with the same commands.
///
/// Resolution errors are folded into the hash so that a run which fails
/// differently from another is reported as divergent.
pub fn verify_resolver_determinism<Setup, Orders>(
    runs: usize,
    turns: u32,
    setup: Setup,
    orders: Orders,
) -> DeterminismResult
where
    Setup: Fn() -> World,
    Orders: Fn(u32) -> TurnMoves,
{
    let constants = GameConstants::default();
    verify_determinism(
        runs,
        turns,
        setup,
        |world, turn| {
            // A failed turn still leaves a world to hash.
            let _ = resolve_turn(world, &orders(turn), &constants, turn);
        },
        World::state_hash,
    )
}

/// Result of parallel resolution runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of turns each run resolved.
    pub turns: u32,
    /// Number of runs.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all runs produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all runs matched.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel resolutions diverged!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_runs,
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Resolve the same match on N threads at once.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_resolutions<Setup, Orders>(
    setup: Setup,
    orders: Orders,
    num_runs: usize,
    turns: u32,
) -> ParallelRunResult
where
    Setup: Fn() -> World + Sync,
    Orders: Fn(u32) -> TurnMoves + Sync,
{
    let constants = GameConstants::default();
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut world = setup();
                    for turn in 1..=turns {
                        let _ = resolve_turn(&mut world, &orders(turn), &constants, turn);
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelRunResult {
        hashes,
        turns,
        num_runs,
    }
}

/// Compare two runs turn-by-turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(turn)` if they diverge
/// at that turn.
pub fn find_first_divergence<Setup, Orders>(setup: Setup, orders: Orders, turns: u32) -> Option<u32>
where
    Setup: Fn() -> World,
    Orders: Fn(u32) -> TurnMoves,
{
    let constants = GameConstants::default();
    let mut first = setup();
    let mut second = setup();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        let moves = orders(turn);
        let a = resolve_turn(&mut first, &moves, &constants, turn).is_ok();
        let b = resolve_turn(&mut second, &moves, &constants, turn).is_ok();

        if a != b || first.state_hash() != second.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Verify that a bincode round-trip preserves a world exactly.
#[must_use]
pub fn verify_serialization_determinism(world: &World) -> bool {
    let Ok(bytes) = world.serialize() else {
        return false;
    };
    let Ok(restored) = World::deserialize(&bytes) else {
        return false;
    };
    restored.serialize().is_ok_and(|again| again == bytes) && restored.state_hash() == world.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for resolver testing.
///
/// These strategies generate random but reproducible worlds and commands
/// for property-based testing.
pub mod strategies {
    use halite_core::entity::{Planet, PlayerId, Ship, ShipIndex};
    use halite_core::math::{Fixed, Vec2Fixed};
    use halite_core::moves::{Move, PlayerMoves, TurnMoves};
    use halite_core::world::World;
    use proptest::prelude::*;

    /// Side length of generated maps.
    pub const MAP_SIDE: u16 = 100;

    /// Generate a location inside a `MAP_SIDE` square map, in quarter units.
    pub fn arb_location() -> impl Strategy<Value = Vec2Fixed> {
        let max = i32::from(MAP_SIDE) * 4;
        (0..max, 0..max).prop_map(|(x, y)| {
            Vec2Fixed::new(Fixed::from_num(x) / 4, Fixed::from_num(y) / 4)
        })
    }

    /// Generate any command, including out-of-range values.
    pub fn arb_move(planets: usize) -> impl Strategy<Value = Move> {
        prop_oneof![
            Just(Move::Noop),
            (-180i16..180).prop_map(Move::Rotate),
            (-2i16..10).prop_map(Move::Thrust),
            (0..planets.max(1) + 1).prop_map(Move::Dock),
            Just(Move::Undock),
        ]
    }

    /// Generate one player's commands for up to `ships` ship slots.
    pub fn arb_player_moves(ships: ShipIndex, planets: usize) -> impl Strategy<Value = PlayerMoves> {
        proptest::collection::btree_map(0..ships.max(1), arb_move(planets), 0..=ships)
    }

    /// Generate commands for every player.
    pub fn arb_turn_moves(
        players: usize,
        ships: ShipIndex,
        planets: usize,
    ) -> impl Strategy<Value = TurnMoves> {
        proptest::collection::vec(arb_player_moves(ships, planets), players)
    }

    /// Generate a world with random ships and planets on fixed, well-spaced
    /// sites so planets never overlap each other.
    pub fn arb_world(
        players: usize,
        max_ships_per_player: usize,
        max_planets: usize,
    ) -> impl Strategy<Value = World> {
        let fleets = proptest::collection::vec(
            proptest::collection::vec((arb_location(), 0u16..360), 1..=max_ships_per_player.max(1)),
            players,
        );
        let planets = proptest::collection::vec(2u16..=6, 0..=max_planets.min(9));
        (fleets, planets).prop_map(move |(fleets, radii)| {
            let mut world = World::new(MAP_SIDE, MAP_SIDE, players);
            for (owner, fleet) in fleets.into_iter().enumerate() {
                for (location, orientation) in fleet {
                    let _ = world.add_ship(owner as PlayerId, Ship::new(location, orientation));
                }
            }
            for (site, radius) in radii.into_iter().enumerate() {
                let x = 20 + 30 * (site % 3) as i32;
                let y = 20 + 30 * (site / 3) as i32;
                world.add_planet(Planet::new(Vec2Fixed::from_ints(x, y), radius));
            }
            world
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel_world, skirmish_world, turn_moves};
    use halite_core::moves::Move;
    use proptest::prelude::*;

    fn charge(turn: u32) -> TurnMoves {
        if turn % 3 == 0 {
            turn_moves(2, &[(0, 0, Move::Rotate(10)), (1, 0, Move::Rotate(-10))])
        } else {
            turn_moves(2, &[(0, 0, Move::Thrust(7)), (1, 0, Move::Thrust(7))])
        }
    }

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |s, turn| *s += u64::from(turn), |s| *s);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![55]);
    }

    #[test]
    fn test_empty_world_determinism() {
        verify_resolver_determinism(3, 20, || World::new(50, 50, 2), |_| Vec::new())
            .assert_deterministic();
    }

    #[test]
    fn test_duel_determinism() {
        verify_resolver_determinism(4, 30, duel_world, charge).assert_deterministic();
    }

    #[test]
    fn test_find_divergence_on_deterministic_resolver() {
        assert_eq!(find_first_divergence(skirmish_world, charge, 40), None);
    }

    #[test]
    fn test_serialization_preserves_complex_state() {
        let mut world = skirmish_world();
        let constants = GameConstants::default();
        for turn in 1..=8 {
            resolve_turn(&mut world, &charge(turn), &constants, turn).unwrap();
        }
        assert!(verify_serialization_determinism(&world));
    }

    #[test]
    fn test_parallel_resolutions() {
        run_parallel_resolutions(skirmish_world, charge, 4, 25).assert_deterministic();
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&duel_world()), compute_hash(&duel_world()));
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        /// Random worlds and commands resolve to identical bytes every time.
        #[test]
        fn prop_random_turns_are_deterministic(
            world in strategies::arb_world(2, 6, 4),
            moves in proptest::collection::vec(strategies::arb_turn_moves(2, 6, 4), 1..5),
        ) {
            let turns = moves.len() as u32;
            let result = verify_resolver_determinism(
                2,
                turns,
                || world.clone(),
                |turn| moves[(turn - 1) as usize].clone(),
            );
            prop_assert!(result.is_deterministic);
        }

        /// Any generated world survives a bincode round-trip.
        #[test]
        fn prop_worlds_roundtrip(world in strategies::arb_world(3, 5, 6)) {
            prop_assert!(verify_serialization_determinism(&world));
        }
    }
}
