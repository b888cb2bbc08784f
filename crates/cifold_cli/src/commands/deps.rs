//! Deps command - Show which fragments a fragment pulls in.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cifold_fragment::{FragmentReader, FsFragmentReader};
use cifold_resolver::paths::target_path;

use super::project::{fragment_files, Project, ProjectArgs};

#[derive(Args)]
pub struct DepsArgs {
    /// Fragment to inspect; every fragment in the templates directory when omitted
    root: Option<PathBuf>,

    #[command(flatten)]
    project: ProjectArgs,

    /// Follow dependencies transitively and print them as a tree
    #[arg(short, long)]
    recursive: bool,
}

pub async fn execute(args: DepsArgs) -> Result<()> {
    let project = args.project.load()?;
    let base = project.base_directory();
    let reader = FsFragmentReader::new();

    let roots = match &args.root {
        Some(root) => project.roots(std::slice::from_ref(root), None)?,
        None => fragment_files(base),
    };

    for root in roots {
        if args.recursive {
            print_tree(&project, &reader, &root).await?;
        } else {
            let parsed = reader
                .parse(&root)
                .await
                .with_context(|| format!("Failed to read {}", root.display()))?;

            println!("📄 {}", project.relative(&root).display());
            for dependency in &parsed.dependencies {
                let target = target_path(dependency, &root, base);
                println!("   → {}", project.relative(&target).display());
            }
        }
    }

    Ok(())
}

/// Depth-first dependency tree. Cycles and unreadable fragments are marked
/// in place instead of aborting.
async fn print_tree(project: &Project, reader: &FsFragmentReader, root: &Path) -> Result<()> {
    let base = project.base_directory();
    let mut pending: Vec<(PathBuf, Vec<PathBuf>)> = vec![(root.to_path_buf(), Vec::new())];

    while let Some((path, ancestors)) = pending.pop() {
        let indent = "  ".repeat(ancestors.len());
        let name = project.relative(&path).display().to_string();

        if ancestors.contains(&path) {
            println!("{}{} (cycle)", indent, name);
            continue;
        }

        let parsed = match reader.parse(&path).await {
            Ok(parsed) => parsed,
            Err(e) if ancestors.is_empty() => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
            Err(e) => {
                println!("{}{} ({})", indent, name, e);
                continue;
            }
        };
        println!("{}{}", indent, name);

        let mut chain = ancestors;
        chain.push(path.clone());
        for dependency in parsed.dependencies.iter().rev() {
            pending.push((target_path(dependency, &path, base), chain.clone()));
        }
    }

    Ok(())
}
