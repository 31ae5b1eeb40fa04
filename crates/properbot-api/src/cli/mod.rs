//! CLI command definitions for the `properbot` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod chat;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with live real-estate data.
#[derive(Parser)]
#[command(name = "properbot", version, about, long_about = None)]
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

    /// Use the built-in fixture listings instead of the harvest service.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "7860")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Start an interactive chat session.
    Chat {
        /// Resume a previous session by ID.
        #[arg(long)]
        resume: Option<String>,
    },

    /// Ask a single question and print the answer.
    Ask {
        /// The question to ask.
        question: String,
    },

    /// Browse past chat sessions.
    #[command(alias = "ls")]
    Sessions {
        /// Maximum sessions to show.
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
