//! CLI argument definitions using clap
//!
//! Commands:
//! - geocheck list --config <path>
//! - geocheck compile --config <path> [--check <id>]
//! - geocheck explain --config <path> (--check <id> | --file <path>)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geocheck - compiles declarative data-quality checks into SQL pipelines
#[derive(Parser, Debug)]
#[command(name = "geocheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List loaded checks and rejected documents
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./geocheck.json")]
        config: PathBuf,
    },

    /// Print the statements of every check, or of one
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./geocheck.json")]
        config: PathBuf,

        /// Class id of a single check
        #[arg(long)]
        check: Option<String>,
    },

    /// Explain how a check compiles
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./geocheck.json")]
        config: PathBuf,

        /// Class id of a loaded check
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        check: Option<String>,

        /// Definition document to explain, accepted or not
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
