//! Text protocol spoken with agents.
//!
//! Every message is newline-terminated; every reply is a single line.
//!
//! ```text
//! init:  <player tag>\n<width> <height>\n<world line>\n   -> <name>
//! turn:  <world line>\n                                   -> <commands>
//! ```
//!
//! The world line lists every player's alive ships, then every alive planet:
//!
//! ```text
//! <players> {<ship count> {<index> <x> <y> <health> <orientation> <status> <progress> <planet|-1>}*}*
//! <planet count> {<index> <x> <y> <health> <radius> <owner|-1> <spots> <current> <remaining> <n> <ship>*}*
//! ```
//!
//! Commands are space-separated: `t <ship> <magnitude>`, `r <ship> <degrees>`,
//! `d <ship> <planet>` and `u <ship>`.

use std::fmt::Display;
use std::str::{FromStr, SplitWhitespace};

use halite_core::entity::{Entity, PlayerId};
use halite_core::math::Fixed;
use halite_core::moves::{Move, PlayerMoves};
use halite_core::world::World;

use crate::error::AgentError;

/// Message opening the init handshake.
#[must_use]
pub fn init_message(player: PlayerId, world: &World) -> String {
    format!(
        "{player}\n{} {}\n{}\n",
        world.width,
        world.height,
        world_line(world)
    )
}

/// Message asking for one turn of commands.
#[must_use]
pub fn turn_message(world: &World) -> String {
    format!("{}\n", world_line(world))
}

/// Serialize the alive part of the world on one line.
#[must_use]
pub fn world_line(world: &World) -> String {
    let mut tokens = vec![world.player_count().to_string()];

    for table in &world.ships {
        let alive: Vec<_> = table
            .iter()
            .enumerate()
            .filter(|(_, ship)| ship.is_alive())
            .collect();
        tokens.push(alive.len().to_string());
        for (index, ship) in alive {
            tokens.extend([
                index.to_string(),
                coordinate(ship.location.x),
                coordinate(ship.location.y),
                ship.health.to_string(),
                ship.orientation.to_string(),
                ship.docking_status.code().to_string(),
                ship.docking_progress.to_string(),
                optional(ship.docked_planet),
            ]);
        }
    }

    let planets: Vec<_> = world
        .planets
        .iter()
        .enumerate()
        .filter(|(_, planet)| planet.is_alive())
        .collect();
    tokens.push(planets.len().to_string());
    for (index, planet) in planets {
        tokens.extend([
            index.to_string(),
            coordinate(planet.location.x),
            coordinate(planet.location.y),
            planet.health.to_string(),
            planet.radius.to_string(),
            optional(planet.owner),
            planet.docking_spots.to_string(),
            planet.current_production.to_string(),
            planet.remaining_production.to_string(),
            planet.docked_ships.len().to_string(),
        ]);
        tokens.extend(planet.docked_ships.iter().map(ToString::to_string));
    }

    tokens.join(" ")
}

/// Parse a command line sent by `player`.
///
/// Commands may only name the player's own alive ships, at most once each.
///
/// # Errors
/// Returns [`AgentError::Protocol`] for unknown commands, missing or
/// unparsable arguments, repeated ships and ships the player does not own.
pub fn parse_moves(line: &str, player: PlayerId, world: &World) -> Result<PlayerMoves, AgentError> {
    let mut tokens = line.split_whitespace();
    let mut moves = PlayerMoves::new();

    while let Some(command) = tokens.next() {
        let ship = next_number(&mut tokens, command)?;
        let mv = match command {
            "t" => Move::Thrust(next_number(&mut tokens, command)?),
            "r" => Move::Rotate(next_number(&mut tokens, command)?),
            "d" => Move::Dock(next_number(&mut tokens, command)?),
            "u" => Move::Undock,
            other => {
                return Err(AgentError::Protocol(format!("unknown command '{other}'")));
            }
        };

        if !world.ship(player, ship).is_ok_and(|s| s.is_alive()) {
            return Err(AgentError::Protocol(format!(
                "ship {ship} does not belong to player {player}"
            )));
        }
        if moves.insert(ship, mv).is_some() {
            return Err(AgentError::Protocol(format!(
                "more than one command for ship {ship}"
            )));
        }
    }

    Ok(moves)
}

/// Validate an init reply and return the agent's name.
///
/// # Errors
/// Returns [`AgentError::Protocol`] if the reply is blank.
pub fn parse_name(line: &str) -> Result<String, AgentError> {
    let name = line.trim();
    if name.is_empty() {
        return Err(AgentError::Protocol("empty name".into()));
    }
    Ok(name.to_string())
}

fn next_number<T: FromStr>(tokens: &mut SplitWhitespace<'_>, command: &str) -> Result<T, AgentError> {
    let token = tokens
        .next()
        .ok_or_else(|| AgentError::Protocol(format!("'{command}' is missing an argument")))?;
    token
        .parse()
        .map_err(|_| AgentError::Protocol(format!("'{token}' is not a valid argument to '{command}'")))
}

fn coordinate(value: Fixed) -> String {
    format!("{:.4}", value.to_num::<f64>())
}

fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}
