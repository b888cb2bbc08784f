//! Build command - Resolve root fragments and write CI documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cifold_generator::{DocumentGenerator, DocumentKind, DocumentWriter, GenerateOptions, OutputFormat};

use super::project::ProjectArgs;

#[derive(Args)]
pub struct BuildArgs {
    /// Root fragments, relative to the templates directory unless they exist as given
    roots: Vec<PathBuf>,

    #[command(flatten)]
    project: ProjectArgs,

    /// Glob selecting root fragments under the templates directory
    #[arg(short, long)]
    pattern: Option<String>,

    /// Directory to write generated documents to (prints to stdout otherwise)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Output format: yaml or json
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Document kind: workflow, job or step-sequence (inferred from the directory by default)
    #[arg(short, long)]
    kind: Option<DocumentKind>,

    /// Omit the provenance header from YAML output
    #[arg(long)]
    no_provenance: bool,
}

pub async fn execute(args: BuildArgs) -> Result<()> {
    let project = args.project.load()?;
    let roots = project.roots(&args.roots, args.pattern.as_deref())?;

    let format = match args.format {
        Some(format) => format,
        None => match project.config.output.format.as_deref() {
            Some(name) => name.parse()?,
            None => OutputFormat::Yaml,
        },
    };
    let provenance = !args.no_provenance && project.config.output.provenance.unwrap_or(true);
    let out_dir = args.out.clone().or_else(|| project.output_directory());

    let engine = project.engine();
    let generator = DocumentGenerator::new(GenerateOptions {
        format,
        provenance,
        timestamp: None,
    });

    info!("Building {} document(s)", roots.len());

    for (index, root) in roots.iter().enumerate() {
        let document = engine
            .resolve_root(root)
            .await
            .with_context(|| format!("Failed to resolve {}", root.display()))?;

        let kind = project.kind_of(&document.source, args.kind);
        let text = generator
            .generate(&document.root, kind, &document.source)
            .with_context(|| format!("Failed to generate {}", document.source.display()))?;

        match &out_dir {
            Some(dir) => {
                let target = DocumentWriter::output_path(
                    &document.source,
                    project.base_directory(),
                    dir,
                    format,
                );
                DocumentWriter::write(&target, &text)?;
                println!(
                    "✅ {} → {}",
                    project.relative(&document.source).display(),
                    target.display()
                );
            }
            None => {
                if index > 0 && format == OutputFormat::Yaml {
                    println!("---");
                }
                print!("{}", text);
            }
        }
    }

    Ok(())
}
