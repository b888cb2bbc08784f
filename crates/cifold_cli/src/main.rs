//! cifold CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Resolution failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cifold_generator::GeneratorError;
use cifold_resolver::{display_chain, ResolveError};

mod commands;

use commands::{Cli, CliError, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const RESOLUTION_FAILURE: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "cifold=debug,warn"
    } else if cli.quiet {
        "error"
    } else {
        "cifold=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so generated documents can be piped from stdout
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Deps(args) => commands::deps::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            let chain = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<ResolveError>())
                .map(ResolveError::chain)
                .unwrap_or_default();
            if !chain.is_empty() {
                eprintln!("   Chain: {}", display_chain(chain));
            }
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ResolveError>() {
            return match err {
                ResolveError::Config { .. } => ExitCodes::INVALID_ARGS,
                _ => ExitCodes::RESOLUTION_FAILURE,
            };
        }
        if let Some(err) = cause.downcast_ref::<GeneratorError>() {
            return match err {
                GeneratorError::Validation { .. }
                | GeneratorError::InvalidShape { .. }
                | GeneratorError::Unresolved { .. } => ExitCodes::VALIDATION_FAILURE,
                GeneratorError::UnknownKind(_) | GeneratorError::UnknownFormat(_) => {
                    ExitCodes::INVALID_ARGS
                }
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::ValidationFailed { .. } => ExitCodes::VALIDATION_FAILURE,
                CliError::InvalidVariable(_)
                | CliError::NoRoots(_)
                | CliError::InvalidPattern { .. } => ExitCodes::INVALID_ARGS,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
