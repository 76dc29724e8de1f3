use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dcc")]
#[command(author, version, about = "Data classification inference over declaration graphs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Analysis configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer the effective classification of every declaration in a graph
    Infer {
        /// Declaration graph (JSON)
        graph: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the classification lattice
    Lattice,

    /// Compare two qualifiers
    Check {
        /// Candidate subtype, e.g. "Confidential[billing]"
        sub: String,

        /// Candidate supertype
        sup: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
