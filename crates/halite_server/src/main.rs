//! Halite match host.
//!
//! Starts one agent process per player, plays a match and prints the result
//! as JSON on stdout. Logs go to stderr and are filtered with `RUST_LOG`.
//!
//! ```bash
//! halite_server --width 160 --height 120 --seed 42 "./bot_a" "python3 bot_b.py"
//! ```

use std::process::ExitCode;

use clap::Parser;
use halite_server::{Agent, Match, ProcessAgent, ServerConfig, ServerError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "halite_server")]
#[command(about = "Run a Halite match between agent programs")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,

    /// Shell commands starting the agents, one per player
    #[arg(required = true)]
    agents: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Match aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = cli.config;
    config.players = cli.agents.len();

    if let Some(directory) = &config.log_directory {
        std::fs::create_dir_all(directory).map_err(|e| ServerError::Agent(e.into()))?;
    }

    let mut agents: Vec<Box<dyn Agent>> = Vec::with_capacity(cli.agents.len());
    for (tag, command) in cli.agents.iter().enumerate() {
        let log_file = config
            .log_directory
            .as_ref()
            .map(|directory| directory.join(format!("agent-{tag}.log")));
        agents.push(Box::new(ProcessAgent::spawn(command, log_file.as_deref())?));
    }

    let result = Match::new(config, agents)?.run().await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
