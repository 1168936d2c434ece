//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Mode;

/// Bird clock.
///
/// Shows the bird scheduled for the current time of day, stays quiet during
/// each season's quiet hours, and plays bird calls on request.
#[derive(Debug, Parser)]
#[command(name = "birdclock", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the clock until quit (interactive) or killed (deployed).
    Run {
        /// Input and display mode; overrides the configured mode.
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Start the clock at this time instead of now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the state for a single point in time.
    Resolve {
        /// Time to resolve (defaults to now).
        #[arg(long)]
        at: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print each season's months, quiet hours and merged schedule.
    Schedule {
        /// Only show this season.
        #[arg(long)]
        season: Option<String>,
    },

    /// Validate the catalog file.
    Check,
}
