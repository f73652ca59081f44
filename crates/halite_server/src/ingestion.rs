//! Concurrent, deadline-bounded collection of agent replies.
//!
//! Every live agent is asked at once and the requests are joined, so a turn
//! waits about as long as the slowest allowed reply. One agent failing never
//! affects the others.

use std::time::Duration;

use futures::future::join_all;
use halite_core::entity::PlayerId;
use halite_core::moves::PlayerMoves;
use halite_core::world::World;
use tokio::time::{timeout, Instant};

use crate::agent::Agent;
use crate::error::AgentError;
use crate::protocol;

/// Why an agent produced no usable reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutReason {
    /// The deadline passed.
    Deadline,
    /// The reply broke the protocol.
    Protocol(String),
    /// The agent went away.
    Disconnected,
}

impl From<AgentError> for TimeoutReason {
    fn from(error: AgentError) -> Self {
        match error {
            AgentError::Timeout(_) => Self::Deadline,
            AgentError::Protocol(message) => Self::Protocol(message),
            AgentError::Disconnected | AgentError::Io(_) => Self::Disconnected,
        }
    }
}

/// Result of asking one agent for something.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// A valid reply arrived.
    Responded {
        /// The parsed reply.
        value: T,
        /// Time between sending the message and receiving the reply.
        elapsed: Duration,
    },
    /// No usable reply.
    TimedOut {
        /// What went wrong.
        reason: TimeoutReason,
    },
}

impl<T> Outcome<T> {
    fn from_result(result: Result<(T, Duration), AgentError>) -> Self {
        match result {
            Ok((value, elapsed)) => Self::Responded { value, elapsed },
            Err(error) => Self::TimedOut {
                reason: error.into(),
            },
        }
    }
}

/// Send `message` and wait for the reply, bounded by `deadline` if given.
///
/// # Errors
/// Returns [`AgentError::Timeout`] when the deadline passes, or whatever
/// error the agent itself reports.
pub async fn exchange(
    agent: &mut dyn Agent,
    message: &str,
    deadline: Option<Duration>,
) -> Result<(String, Duration), AgentError> {
    let started = Instant::now();
    let reply = match deadline {
        Some(limit) => timeout(limit, agent.exchange(message))
            .await
            .map_err(|_| AgentError::Timeout(limit))??,
        None => agent.exchange(message).await?,
    };
    Ok((reply, started.elapsed()))
}

/// Run the init handshake with every agent.
///
/// Agent `i` plays as player `i`. Returns one outcome per agent, in order.
pub async fn collect_names(
    agents: &mut [Box<dyn Agent>],
    world: &World,
    deadline: Option<Duration>,
) -> Vec<(PlayerId, Outcome<String>)> {
    let requests = agents.iter_mut().enumerate().map(|(index, agent)| async move {
        let player = index as PlayerId;
        let message = protocol::init_message(player, world);
        let result = exchange(&mut **agent, &message, deadline)
            .await
            .and_then(|(reply, elapsed)| Ok((protocol::parse_name(&reply)?, elapsed)));
        (player, Outcome::from_result(result))
    });
    join_all(requests).await
}

/// Ask every live agent for its commands for the coming turn.
///
/// Agents whose entry in `alive` is false are skipped.
pub async fn collect_moves(
    agents: &mut [Box<dyn Agent>],
    alive: &[bool],
    world: &World,
    deadline: Option<Duration>,
) -> Vec<(PlayerId, Outcome<PlayerMoves>)> {
    let message = protocol::turn_message(world);
    let message = message.as_str();
    let requests = agents
        .iter_mut()
        .enumerate()
        .filter(|(index, _)| alive.get(*index).copied().unwrap_or(false))
        .map(|(index, agent)| async move {
            let player = index as PlayerId;
            let result = exchange(&mut **agent, message, deadline)
                .await
                .and_then(|(reply, elapsed)| {
                    Ok((protocol::parse_moves(&reply, player, world)?, elapsed))
                });
            (player, Outcome::from_result(result))
        });
    join_all(requests).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Reply, ScriptedAgent};
    use halite_core::moves::Move;
    use halite_test_utils::fixtures::{duel_world, WorldBuilder};

    fn agents(agents: Vec<ScriptedAgent>) -> Vec<Box<dyn Agent>> {
        agents
            .into_iter()
            .map(|a| Box::new(a) as Box<dyn Agent>)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_agent_times_out_alone() {
        let world = duel_world();
        let mut agents = agents(vec![
            ScriptedAgent::with_replies([Reply::Delayed(Duration::from_millis(300), "t 0 7".into())]),
            ScriptedAgent::with_replies([Reply::Delayed(Duration::from_secs(5), "t 0 7".into())]),
        ]);

        let outcomes =
            collect_moves(&mut agents, &[true, true], &world, Some(Duration::from_secs(1))).await;

        assert_eq!(outcomes.len(), 2);
        match &outcomes[0] {
            (0, Outcome::Responded { value, elapsed }) => {
                assert_eq!(value[&0], Move::Thrust(7));
                assert!(*elapsed >= Duration::from_millis(300));
                assert!(*elapsed < Duration::from_secs(1));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            outcomes[1],
            (
                1,
                Outcome::TimedOut {
                    reason: TimeoutReason::Deadline
                }
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_run_concurrently() {
        let world = duel_world();
        let delay = Duration::from_millis(800);
        let mut agents = agents(vec![
            ScriptedAgent::with_replies([Reply::Delayed(delay, String::new())]),
            ScriptedAgent::with_replies([Reply::Delayed(delay, String::new())]),
        ]);

        let started = Instant::now();
        let outcomes =
            collect_moves(&mut agents, &[true, true], &world, Some(Duration::from_secs(1))).await;

        assert!(outcomes
            .iter()
            .all(|(_, o)| matches!(o, Outcome::Responded { .. })));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_deadline_slow_replies_are_accepted() {
        let world = WorldBuilder::new(40, 40, 1).ship(0, 10.0, 10.0, 0).build();
        let mut agents = agents(vec![ScriptedAgent::with_replies([Reply::Delayed(
            Duration::from_secs(30),
            "r 0 15".into(),
        )])]);

        let outcomes = collect_moves(&mut agents, &[true], &world, None).await;
        assert!(matches!(
            &outcomes[0],
            (0, Outcome::Responded { value, .. }) if value[&0] == Move::Rotate(15)
        ));
    }

    #[tokio::test]
    async fn test_protocol_errors_and_hangups() {
        let world = duel_world();
        let mut agents = agents(vec![
            ScriptedAgent::with_replies([Reply::line("t 0 seven")]),
            ScriptedAgent::with_replies([Reply::Hangup]),
        ]);

        let outcomes =
            collect_moves(&mut agents, &[true, true], &world, Some(Duration::from_secs(1))).await;
        assert!(matches!(
            outcomes[0].1,
            Outcome::TimedOut {
                reason: TimeoutReason::Protocol(_)
            }
        ));
        assert_eq!(
            outcomes[1].1,
            Outcome::TimedOut {
                reason: TimeoutReason::Disconnected
            }
        );
    }

    #[tokio::test]
    async fn test_eliminated_players_are_not_asked() {
        let world = duel_world();
        let mut agents = agents(vec![ScriptedAgent::default(), ScriptedAgent::default()]);
        let outcomes = collect_moves(&mut agents, &[false, true], &world, None).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, 1);
    }

    #[tokio::test]
    async fn test_handshake_collects_names() {
        let world = duel_world();
        let mut agents = agents(vec![
            ScriptedAgent::new("alpha"),
            ScriptedAgent::with_replies([Reply::line("   ")]),
        ]);

        let outcomes = collect_names(&mut agents, &world, Some(Duration::from_secs(5))).await;
        assert!(matches!(
            &outcomes[0],
            (0, Outcome::Responded { value, .. }) if value == "alpha"
        ));
        assert!(matches!(
            outcomes[1].1,
            Outcome::TimedOut {
                reason: TimeoutReason::Protocol(_)
            }
        ));
    }
}
