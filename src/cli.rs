//! Command-line interface for flap-track.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::Verbosity;

/// flap-track - Flappy Bird in your terminal, with a memory
///
/// Every game is appended to a CSV log; the statistics screen and the
/// dashboard are computed from it.
#[derive(Debug, Parser)]
#[command(name = "flap-track")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session log to read and append to (overrides the configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_path: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Play without sound
    #[arg(long, global = true)]
    pub mute: bool,

    /// Seed for pipe placement, for reproducible runs
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// The command to execute (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play the game
    Play,

    /// Open the analytics dashboard
    Dashboard,

    /// Print games played, highest score and average score
    Stats(StatsCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,
    /// Show the configuration file path
    Path,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// The subcommand, with `play` standing in for none.
    #[must_use]
    pub fn subcommand(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Play)
    }
}
