//! Fragment path handling.
//!
//! Paths are normalized lexically so that cycle detection and cache keys see
//! one spelling per file regardless of how a reference was written, and so
//! that in-memory readers work without touching the filesystem.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize `.` and `..` components without consulting the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `path` made absolute against the working directory and normalized.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    Ok(normalize(&std::env::current_dir()?.join(path)))
}

/// Absolute form of a root path given to the engine. `base_directory` must
/// be absolute already.
pub fn root_path(path: &Path, base_directory: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_directory.join(path))
    }
}

/// Absolute form of a Reference/Inclusion target.
///
/// `./` and `../` targets are relative to the referring file's directory;
/// any other relative target is relative to the base directory.
pub fn target_path(target: &str, current_file: &Path, base_directory: &Path) -> PathBuf {
    let target_path = Path::new(target);
    if target_path.is_absolute() {
        return normalize(target_path);
    }

    if target.starts_with("./") || target.starts_with("../") {
        let dir = current_file.parent().unwrap_or(base_directory);
        normalize(&dir.join(target_path))
    } else {
        normalize(&base_directory.join(target_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/tpl/jobs/../steps/./a.yml")),
            PathBuf::from("/tpl/steps/a.yml")
        );
        assert_eq!(normalize(Path::new("../x.yml")), PathBuf::from("../x.yml"));
    }

    #[test]
    fn test_target_relative_to_base() {
        let path = target_path("steps/a.yml", Path::new("/tpl/jobs/build.yml"), Path::new("/tpl"));
        assert_eq!(path, PathBuf::from("/tpl/steps/a.yml"));
    }

    #[test]
    fn test_target_relative_to_current_file() {
        let current = Path::new("/tpl/jobs/build.yml");
        assert_eq!(
            target_path("./common.yml", current, Path::new("/tpl")),
            PathBuf::from("/tpl/jobs/common.yml")
        );
        assert_eq!(
            target_path("../steps/a.yml", current, Path::new("/tpl")),
            PathBuf::from("/tpl/steps/a.yml")
        );
    }

    #[test]
    fn test_absolute_target() {
        let path = target_path("/shared/a.yml", Path::new("/tpl/ci.yml"), Path::new("/tpl"));
        assert_eq!(path, PathBuf::from("/shared/a.yml"));
    }

    #[test]
    fn test_absolute_joins_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("tpl/./a.yml")).unwrap(), cwd.join("tpl/a.yml"));
        assert_eq!(
            absolute(Path::new("/tpl/jobs/../a.yml")).unwrap(),
            PathBuf::from("/tpl/a.yml")
        );
    }

    #[test]
    fn test_root_path() {
        assert_eq!(
            root_path(Path::new("workflows/ci.yml"), Path::new("/tpl")),
            PathBuf::from("/tpl/workflows/ci.yml")
        );
    }
}
