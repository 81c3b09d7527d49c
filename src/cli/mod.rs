//! CLI module for Roster
//!
//! Provides commands:
//! - `ask`: route a request through the dispatcher
//! - `classify`: show the complexity verdict for a request
//! - `agents`: list the loaded agent directory

use clap::{Parser, Subcommand};

pub mod agents;
pub mod ask;
pub mod classify;

/// Roster agent orchestration CLI
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Route requests to specialist agents or a collaborating team")]
#[command(version)]
pub struct Cli {
    /// Emit JSON logs and JSON command output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the roster a question
    Ask(ask::AskArgs),
    /// Show how a request would be classified
    Classify {
        /// Request text
        request: String,
    },
    /// List the loaded agents
    Agents,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Ask(args)) => ask::run(args, cli.json).await,
        Some(Commands::Classify { request }) => classify::run(&request, cli.json),
        Some(Commands::Agents) => agents::run(cli.json).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
