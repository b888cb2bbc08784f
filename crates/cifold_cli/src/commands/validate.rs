//! Validate command - Resolve root fragments and check their structure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cifold_generator::{DocumentKind, DocumentValidator};

use super::project::ProjectArgs;
use super::CliError;

#[derive(Args)]
pub struct ValidateArgs {
    /// Root fragments, relative to the templates directory unless they exist as given
    roots: Vec<PathBuf>,

    #[command(flatten)]
    project: ProjectArgs,

    /// Glob selecting root fragments under the templates directory
    #[arg(short, long)]
    pattern: Option<String>,

    /// Document kind: workflow, job or step-sequence (inferred from the directory by default)
    #[arg(short, long)]
    kind: Option<DocumentKind>,

    /// Treat warnings as failures
    #[arg(long)]
    strict: bool,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    let project = args.project.load()?;
    let roots = project.roots(&args.roots, args.pattern.as_deref())?;
    let engine = project.engine();
    let validator = DocumentValidator::default();

    info!("Validating {} document(s)", roots.len());

    let mut failed = 0;
    for root in &roots {
        let document = engine
            .resolve_root(root)
            .await
            .with_context(|| format!("Failed to resolve {}", root.display()))?;

        let kind = project.kind_of(&document.source, args.kind);
        let result = validator.validate(&document.root, kind);
        let name = project.relative(&document.source).display().to_string();

        let passed = result.valid && !(args.strict && !result.warnings.is_empty());
        if passed {
            println!("✅ {} ({})", name, kind);
        } else {
            failed += 1;
            println!("❌ {} ({})", name, kind);
        }
        for error in &result.errors {
            println!("      - {}", error);
        }
        for warning in &result.warnings {
            println!("   ⚠️  {}", warning);
        }
    }

    println!();
    if failed > 0 {
        return Err(CliError::ValidationFailed {
            failed,
            total: roots.len(),
        }
        .into());
    }

    println!("✅ All {} document(s) valid", roots.len());
    Ok(())
}
