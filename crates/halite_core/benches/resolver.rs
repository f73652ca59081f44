//! Turn resolution benchmarks for halite_core.
//!
//! Run with: `cargo bench -p halite_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use halite_core::map_generation::{generate_map, MapConfig};
use halite_core::moves::{Move, PlayerMoves, TurnMoves};
use halite_core::resolver::resolve_turn;
use halite_core::rules::GameConstants;
use halite_core::world::World;

fn full_thrust(world: &World) -> TurnMoves {
    world
        .ships
        .iter()
        .map(|table| {
            (0..table.len())
                .map(|slot| (slot, Move::Thrust(7)))
                .collect::<PlayerMoves>()
        })
        .collect()
}

/// Benchmarks resolving a turn where every ship moves at full thrust.
pub fn resolver_benchmark(c: &mut Criterion) {
    let constants = GameConstants::default();

    for players in [2usize, 4] {
        let config = MapConfig {
            ships_per_player: 20,
            players,
            ..MapConfig::default()
        };
        let Ok(world) = generate_map(&config) else {
            continue;
        };
        let moves = full_thrust(&world);

        c.bench_function(&format!("resolve_turn_{players}p_full_thrust"), |b| {
            b.iter_batched(
                || world.clone(),
                |mut world| black_box(resolve_turn(&mut world, &moves, &constants, 1)),
                BatchSize::SmallInput,
            );
        });
    }

    let idle = generate_map(&MapConfig::default()).unwrap_or_else(|_| World::new(240, 160, 2));
    c.bench_function("resolve_turn_idle", |b| {
        b.iter_batched(
            || idle.clone(),
            |mut world| black_box(resolve_turn(&mut world, &[], &constants, 1)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, resolver_benchmark);
criterion_main!(benches);
