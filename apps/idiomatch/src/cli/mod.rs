//! # CLI Module
//!
//! ## Available Commands
//!
//! - `inspect` - Summarize the relations and predicates of a store
//! - `search` - Run a pattern manifest against a store
//! - `check` - Validate a pattern manifest without searching
//! - `pack` - Write a store in the packed binary format
//! - `unpack` - Write a store as JSON

mod commands;

use clap::{Parser, Subcommand};
use idiomatch_core::IdiomError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// idiomatch - structural idiom detection
///
/// Finds every assignment of pattern variables to graph nodes that satisfies
/// a set of edge, predicate, ordering and dominance constraints.
#[derive(Parser, Debug)]
#[command(name = "idiomatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the store (JSON or packed)
    #[arg(short = 'S', long, global = true, default_value = "store.json")]
    pub store: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the store
    Inspect,

    /// Search for matches of a pattern
    Search {
        /// Path to the pattern manifest (TOML)
        #[arg(short, long)]
        pattern: PathBuf,

        /// Maximum number of solutions
        #[arg(short, long)]
        max: Option<usize>,

        /// Report every solution, ignoring any cap
        #[arg(short, long, conflicts_with = "max")]
        all: bool,

        /// Render nodes by label instead of index
        #[arg(short, long)]
        labels: bool,
    },

    /// Validate a pattern against the store
    Check {
        /// Path to the pattern manifest (TOML)
        #[arg(short, long)]
        pattern: PathBuf,
    },

    /// Write the store in the packed binary format
    Pack {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the store as JSON
    Unpack {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), IdiomError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Search {
            pattern,
            max,
            all,
            labels,
        }) => {
            let limit = if all { Some(usize::MAX) } else { max };
            cmd_search(&cli.store, &pattern, limit, labels, json_mode)
        }
        Some(Commands::Check { pattern }) => cmd_check(&cli.store, &pattern, json_mode),
        Some(Commands::Pack { output }) => cmd_pack(&cli.store, &output),
        Some(Commands::Unpack { output }) => cmd_unpack(&cli.store, &output),
        Some(Commands::Inspect) | None => cmd_inspect(&cli.store, json_mode),
    }
}
