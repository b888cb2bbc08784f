//! Writing generated documents to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::OutputFormat;

/// Writer for generated documents.
pub struct DocumentWriter;

impl DocumentWriter {
    /// Write `text` to `path`, creating parent directories as needed.
    pub fn write(path: &Path, text: &str) -> GeneratorResult<()> {
        debug!("Writing generated document to {:?}", path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GeneratorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, text).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Output location for `source` under `out_dir`, keeping its path
    /// relative to `root` and switching the extension to match `format`.
    pub fn output_path(source: &Path, root: &Path, out_dir: &Path, format: OutputFormat) -> PathBuf {
        let relative = source
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source.file_name().map(PathBuf::from).unwrap_or_default());

        out_dir.join(relative).with_extension(format.extension())
    }
}
