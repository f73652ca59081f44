//! Whole matches between scripted agents.

use std::collections::BTreeSet;
use std::time::Duration;

use halite_core::prelude::*;
use halite_server::{Agent, Match, Reply, ScriptedAgent, ServerConfig};
use halite_test_utils::fixtures::WorldBuilder;

fn config() -> ServerConfig {
    ServerConfig {
        seed: Some(1),
        replay_enabled: false,
        init_deadline_ms: 5_000,
        turn_deadline_ms: 1_000,
        max_turns: Some(10),
        ..ServerConfig::default()
    }
}

fn boxed(agents: Vec<ScriptedAgent>) -> Vec<Box<dyn Agent>> {
    agents
        .into_iter()
        .map(|a| Box::new(a) as Box<dyn Agent>)
        .collect()
}

/// Player 0 has two ships, player 1 one, far apart.
fn arena() -> World {
    WorldBuilder::new(80, 60, 2)
        .ship(0, 10.0, 10.0, 0)
        .ship(0, 10.0, 50.0, 0)
        .ship(1, 70.0, 10.0, 180)
        .build()
}

fn play(config: ServerConfig, world: World, agents: Vec<ScriptedAgent>) -> Match {
    Match::with_world(config, GameConstants::default(), 1, world, boxed(agents)).unwrap()
}

/// Replies for the init handshake and `turns` quiet turns, then `reply`.
fn after_quiet_turns(name: &str, turns: usize, reply: Reply) -> ScriptedAgent {
    let mut agent = ScriptedAgent::new(name);
    for _ in 0..turns {
        agent = agent.then(Reply::line(""));
    }
    agent.then(reply)
}

#[tokio::test(start_paused = true)]
async fn slow_agent_is_eliminated_on_the_turn_it_times_out() {
    let agents = vec![
        ScriptedAgent::new("zero"),
        after_quiet_turns("one", 2, Reply::Delayed(Duration::from_secs(5), String::new())),
    ];
    let result = play(config(), arena(), agents).run().await.unwrap();

    assert_eq!(result.timeout_tags, BTreeSet::from([1]));
    let zero = &result.player_statistics[0];
    let one = &result.player_statistics[1];
    assert_eq!(one.last_frame_alive, 3);
    assert_eq!(one.rank, 2);
    // The match stops once a single player is left.
    assert_eq!(zero.last_frame_alive, 3);
    assert_eq!(zero.rank, 1);
    assert_eq!(zero.name, "zero");
    assert_eq!(one.name, "one");
}

#[tokio::test(start_paused = true)]
async fn ignore_timeout_waits_for_slow_agents() {
    let agents = vec![
        ScriptedAgent::new("zero"),
        after_quiet_turns("one", 2, Reply::Delayed(Duration::from_secs(5), "t 0 3".into())),
    ];
    let config = ServerConfig {
        ignore_timeout: true,
        ..config()
    };
    let result = play(config, arena(), agents).run().await.unwrap();

    assert!(result.timeout_tags.is_empty());
    assert!(result
        .player_statistics
        .iter()
        .all(|p| p.last_frame_alive == 10));
    assert!(result.player_statistics[1].average_frame_response_time_ms > 0.0);
}

#[tokio::test]
async fn ignore_timeout_keeps_misbehaving_agents_in_play() {
    let agents = vec![
        ScriptedAgent::new("zero"),
        after_quiet_turns("one", 0, Reply::line("launch everything")),
    ];
    let config = ServerConfig {
        ignore_timeout: true,
        ..config()
    };
    let result = play(config, arena(), agents).run().await.unwrap();

    assert_eq!(result.timeout_tags, BTreeSet::from([1]));
    assert_eq!(result.player_statistics[1].last_frame_alive, 10);
}

#[tokio::test]
async fn protocol_error_counts_as_timeout() {
    let agents = vec![
        ScriptedAgent::new("zero").repeating("t 0 1"),
        after_quiet_turns("one", 0, Reply::line("t 0 7 t 0 7")),
    ];
    let result = play(config(), arena(), agents).run().await.unwrap();

    assert_eq!(result.timeout_tags, BTreeSet::from([1]));
    assert_eq!(result.player_statistics[1].last_frame_alive, 1);
    assert_eq!(result.player_statistics[1].rank, 2);
    assert_eq!(result.player_statistics[0].rank, 1);
}

#[tokio::test]
async fn failed_handshake_eliminates_before_turn_one() {
    let agents = vec![
        ScriptedAgent::new("zero"),
        ScriptedAgent::with_replies([Reply::Hangup]),
    ];
    let result = play(config(), arena(), agents).run().await.unwrap();

    assert_eq!(result.timeout_tags, BTreeSet::from([1]));
    let one = &result.player_statistics[1];
    assert_eq!(one.last_frame_alive, 0);
    assert_eq!(one.rank, 2);
    assert!(one.name.is_empty());
    assert_eq!(result.player_statistics[0].rank, 1);
}

#[tokio::test]
async fn destroyed_fleet_ends_the_match_and_replay_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldBuilder::new(60, 60, 2)
        .ship(0, 10.0, 20.0, 0)
        .ship(0, 10.0, 50.0, 0)
        .ship(1, 20.0, 20.0, 180)
        .build();
    let constants = GameConstants {
        weapon_damage: 200,
        ..GameConstants::default()
    };
    let config = ServerConfig {
        replay_enabled: true,
        replay_directory: dir.path().to_path_buf(),
        ..config()
    };
    let agents = boxed(vec![
        ScriptedAgent::new("zero").then(Reply::line("t 0 7")),
        ScriptedAgent::new("one").then(Reply::line("t 0 7")),
    ]);

    let result = Match::with_world(config, constants, 9, world, agents)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(result.timeout_tags.is_empty());
    assert_eq!(result.player_statistics[0].rank, 1);
    assert_eq!(result.player_statistics[1].rank, 2);
    assert_eq!(result.player_statistics[1].last_frame_alive, 1);

    let path = result.output_filename.expect("replay written");
    let replay = Replay::load(&path).unwrap();
    assert_eq!(replay.final_turn, 1);
    assert_eq!(replay.seed, 9);
    assert_eq!(replay.player_names, vec!["zero".to_string(), "one".to_string()]);
    assert_eq!(replay.frames.len(), 2);
    assert_eq!(replay.frames[1].alive_ship_count(), 1);
    assert!(ReplayPlayer::new(replay).unwrap().verify().unwrap());
}

#[tokio::test]
async fn replay_keeps_rejected_commands_as_sent() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldBuilder::new(80, 60, 2)
        .ship(0, 10.0, 10.0, 0)
        .ship(1, 70.0, 10.0, 180)
        .planet(40.0, 40.0, 4)
        .build();
    let config = ServerConfig {
        replay_enabled: true,
        replay_directory: dir.path().to_path_buf(),
        max_turns: Some(1),
        ..config()
    };
    let agents = vec![
        ScriptedAgent::new("zero").then(Reply::line("d 0 0")),
        ScriptedAgent::new("one").then(Reply::line("t 0 2")),
    ];

    let result = play(config, world, agents).run().await.unwrap();
    let replay = Replay::load(result.output_filename.expect("replay written")).unwrap();

    assert_eq!(replay.commands.len(), 1);
    assert_eq!(replay.commands[0][0][&0], Move::Dock(0));
    assert_eq!(replay.moves[0][0][&0], Move::Error);
    assert_eq!(replay.commands[0][1][&0], Move::Thrust(2));
    assert!(ReplayPlayer::new(replay).unwrap().verify().unwrap());
}

#[tokio::test]
async fn generated_match_runs_to_the_turn_limit() {
    let config = ServerConfig {
        players: 4,
        max_turns: Some(5),
        ..config()
    };
    let agents = boxed(
        ["a", "b", "c", "d"]
            .into_iter()
            .map(ScriptedAgent::new)
            .collect(),
    );

    let result = Match::new(config, agents).unwrap().run().await.unwrap();

    let ranks: Vec<u32> = result.player_statistics.iter().map(|p| p.rank).collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
    assert!(result
        .player_statistics
        .iter()
        .all(|p| p.last_frame_alive == 5));
    assert!(result.output_filename.is_none());
}

#[tokio::test]
async fn result_serializes_to_json() {
    let agents = vec![ScriptedAgent::new("zero"), ScriptedAgent::new("one")];
    let config = ServerConfig {
        max_turns: Some(2),
        ..config()
    };
    let result = play(config, arena(), agents).run().await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["player_statistics"][0]["name"], "zero");
    assert_eq!(json["player_statistics"][0]["rank"], 1);
    assert_eq!(json["timeout_tags"], serde_json::json!([]));
}
