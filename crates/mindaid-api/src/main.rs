//! MindAid CLI entry point.
//!
//! Binary name: `mindaid`
//!
//! Parses CLI arguments, initializes tracing, the database and services, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use mindaid_observe::tracing_setup::{init_tracing, shutdown_tracing, Verbosity};

use cli::{Cli, Commands, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(Verbosity::from_flags(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mindaid", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::History { markdown } => {
            cli::history::show_history(&state, cli.json, markdown).await?;
        }

        Commands::Session { action } => match action {
            SessionCommand::Show => {
                cli::session::show_session(&state, cli.json).await?;
            }
            SessionCommand::Reset { force } => {
                cli::session::reset_session(&state, force, cli.json).await?;
            }
        },

        Commands::Completions { .. } => {}
    }

    Ok(())
}
