//! Document kinds.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// Shape a root fragment declares.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Workflow,
    Job,
    StepSequence,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Job => "job",
            Self::StepSequence => "step-sequence",
        }
    }

    /// Kind declared by the directory a fragment lives in
    /// (`workflows/`, `jobs/`, `steps/`), if any.
    pub fn infer(path: &Path) -> Option<Self> {
        path.ancestors()
            .skip(1)
            .filter_map(|dir| dir.file_name())
            .find_map(|name| match name.to_string_lossy().to_lowercase().as_str() {
                "workflows" | "workflow" => Some(Self::Workflow),
                "jobs" | "job" => Some(Self::Job),
                "steps" | "step" => Some(Self::StepSequence),
                _ => None,
            })
    }
}

impl FromStr for DocumentKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workflow" => Ok(Self::Workflow),
            "job" => Ok(Self::Job),
            "step-sequence" | "steps" => Ok(Self::StepSequence),
            other => Err(GeneratorError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_directory() {
        assert_eq!(
            DocumentKind::infer(Path::new("/tpl/workflows/ci.yml")),
            Some(DocumentKind::Workflow)
        );
        assert_eq!(
            DocumentKind::infer(Path::new("/tpl/jobs/rust/build.yml")),
            Some(DocumentKind::Job)
        );
        assert_eq!(
            DocumentKind::infer(Path::new("steps/setup.yml")),
            Some(DocumentKind::StepSequence)
        );
        assert_eq!(DocumentKind::infer(Path::new("/tpl/misc/x.yml")), None);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Workflow".parse::<DocumentKind>().unwrap(), DocumentKind::Workflow);
        assert_eq!("steps".parse::<DocumentKind>().unwrap(), DocumentKind::StepSequence);
        assert!("pipeline".parse::<DocumentKind>().is_err());
    }
}
