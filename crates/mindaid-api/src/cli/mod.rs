//! CLI command definitions and dispatch for the `mindaid` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod history;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Talk things through with the MindAid assistant.
#[derive(Parser)]
#[command(name = "mindaid", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat,

    /// Show the stored conversation of the current session.
    History {
        /// Print as Markdown instead of a table.
        #[arg(long)]
        markdown: bool,
    },

    /// Inspect or reset the anonymous session.
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the current session id and message count.
    Show,

    /// Delete the session's history and start a new session.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}
