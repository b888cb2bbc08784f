//! CLI command definitions.
//!
//! Each subcommand resolves one or more root fragments from a templates
//! directory and does something with the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

pub mod build;
pub mod deps;
pub mod project;
pub mod validate;

/// cifold - compose CI documents from reusable YAML fragments
#[derive(Parser)]
#[command(name = "cifold")]
#[command(version, about = "cifold - compose CI documents from reusable YAML fragments")]
#[command(long_about = r#"
cifold resolves `!reference` and `!include` tags between YAML fragments,
substitutes ${variables}, and writes the finished CI documents.

COMMANDS:
  build     → Resolve root fragments and write generated documents
  validate  → Resolve root fragments and check their structure
  deps      → Show the fragments a fragment depends on

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Resolution failure (cycle, depth limit, unreadable fragment)
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve root fragments and generate CI documents
    Build(build::BuildArgs),

    /// Resolve root fragments and validate the result
    Validate(validate::ValidateArgs),

    /// List the dependencies of fragments
    Deps(deps::DepsArgs),
}

/// Errors raised by the CLI itself rather than the library crates.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid variable `{0}`: expected KEY=VALUE with a dotted key")]
    InvalidVariable(String),

    #[error("No root fragments found under {0}")]
    NoRoots(PathBuf),

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Validation failed for {failed} of {total} document(s)")]
    ValidationFailed { failed: usize, total: usize },
}
