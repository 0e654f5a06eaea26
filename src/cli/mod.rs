//! CLI module for geocheck
//!
//! Provides command-line interface for:
//! - list: Loaded checks and rejected documents
//! - compile: Statements of compiled checks as JSON
//! - explain: Human-readable plan of one check

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, explain, explain_file, list, run, run_command, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_text};
