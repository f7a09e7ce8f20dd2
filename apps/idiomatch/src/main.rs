//! # idiomatch
//!
//! Command line front end for the idiomatch engine.
//!
//! ## Usage
//!
//! ```bash
//! # Summarize a store
//! idiomatch -S store.json inspect
//!
//! # Find every match of a pattern manifest
//! idiomatch -S store.json search -p pattern.toml --all --labels
//!
//! # Convert a JSON store to the packed format
//! idiomatch -S store.json pack -o store.idlm
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // IDIOMATCH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("IDIOMATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose {
        "idiomatch=debug,idiomatch_core=debug"
    } else if cli.quiet {
        "idiomatch=warn,idiomatch_core=warn"
    } else {
        "idiomatch=info,idiomatch_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
