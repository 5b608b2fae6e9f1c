//! Command-line interface definition for arenachat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, battle history, stats, and local threads.

use clap::{Parser, Subcommand};

/// Arenachat - LLM battle arena client
///
/// Chat with an aggregator that battles several models per prompt and
/// replies with the winner; browse past battles and the leaderboard.
#[derive(Parser, Debug, Clone)]
#[command(name = "arenachat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/arenachat.yaml")]
    pub config: String,

    /// Override the arena server base URL
    #[arg(short, long)]
    pub server: Option<String>,

    /// Override the thread database directory
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for arenachat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start interactive chat mode
    Chat,

    /// Browse past battles
    Battles {
        /// Battle subcommand
        #[command(subcommand)]
        command: BattleCommand,
    },

    /// Leaderboard statistics
    Stats {
        /// Stats subcommand
        #[command(subcommand)]
        command: StatsCommand,
    },

    /// Local conversation threads
    Threads {
        /// Thread subcommand
        #[command(subcommand)]
        command: ThreadCommand,
    },
}

/// Battle history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum BattleCommand {
    /// List recent battles, most recent first
    List,

    /// Show one battle with every response and rating
    Show {
        /// Battle id
        id: i64,
    },

    /// Delete one battle and its ratings
    Delete {
        /// Battle id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Leaderboard subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StatsCommand {
    /// Show the aggregate leaderboard
    Show,

    /// Clear all battles and statistics
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Local thread subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ThreadCommand {
    /// List persisted conversation threads
    List,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
