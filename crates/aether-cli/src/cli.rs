//! CLI argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "aether",
    version,
    about = "Dependency collection, conflict resolution, and named-lock sync contexts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose (debug) logging regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect and resolve the built-in demo dependency graph
    Resolve {
        /// Conflict-resolver verbosity: none, standard, full
        #[arg(long, default_value = "standard")]
        verbosity: String,
        /// Version-selection strategy: nearest, higher-version
        #[arg(long, default_value = "nearest")]
        version_selector: String,
        /// Fail if any group resolves more than one concrete version
        #[arg(long)]
        enforce_convergence: bool,
    },

    /// Acquire named locks for a set of coordinates and report the order
    Lock {
        /// Coordinates as groupId:artifactId:version
        coordinates: Vec<String>,
        /// Lock mode: shared, exclusive
        #[arg(long, default_value = "exclusive")]
        mode: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
