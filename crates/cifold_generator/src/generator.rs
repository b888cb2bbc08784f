//! Serialization of resolved documents.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use cifold_fragment::Node;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GeneratorError, GeneratorResult};
use crate::kind::DocumentKind;
use crate::validator::{DocumentValidator, ValidationRules};

/// Output serialization format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// File extension for generated files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(GeneratorError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Options controlling generated output.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub format: OutputFormat,
    /// Prefix YAML output with comments naming the source fragment.
    pub provenance: bool,
    /// Fixed generation time; `None` uses the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            provenance: true,
            timestamp: None,
        }
    }
}

/// Validates and serializes resolved documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentGenerator {
    validator: DocumentValidator,
    options: GenerateOptions,
}

impl DocumentGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            validator: DocumentValidator::default(),
            options,
        }
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validator = DocumentValidator::new(rules);
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn validator(&self) -> &DocumentValidator {
        &self.validator
    }

    /// Validate `node` as a document of `kind` and render it as text.
    pub fn generate(&self, node: &Node, kind: DocumentKind, source_path: &Path) -> GeneratorResult<String> {
        self.validator.check(node, kind, source_path)?;

        let report = self.validator.validate(node, kind);
        for warning in &report.warnings {
            warn!("{}: {}", source_path.display(), warning);
        }

        debug!(
            "Generating {} document from {:?} as {}",
            kind, source_path, self.options.format
        );

        match self.options.format {
            OutputFormat::Yaml => {
                let body = serde_yaml::to_string(node)?;
                if self.options.provenance {
                    Ok(format!("{}{}", self.provenance_header(source_path), body))
                } else {
                    Ok(body)
                }
            }
            OutputFormat::Json => {
                let mut body = serde_json::to_string_pretty(node)?;
                body.push('\n');
                Ok(body)
            }
        }
    }

    fn provenance_header(&self, source_path: &Path) -> String {
        let timestamp = self.options.timestamp.unwrap_or_else(Utc::now);
        format!(
            "# Generated by cifold from {}\n# Generated at {}\n# Do not edit by hand; edit the source fragments instead.\n",
            source_path.display(),
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job() -> Node {
        Node::mapping([
            ("runs-on", Node::from("ubuntu-latest")),
            ("steps", Node::sequence(["cargo build", "cargo test"])),
        ])
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_yaml_with_provenance() {
        let generator = DocumentGenerator::new(GenerateOptions {
            timestamp: Some(fixed_time()),
            ..Default::default()
        });

        let text = generator
            .generate(&job(), DocumentKind::Job, Path::new("jobs/build.yml"))
            .unwrap();

        assert!(text.starts_with("# Generated by cifold from jobs/build.yml\n"));
        assert!(text.contains("# Generated at 2024-05-01T12:00:00Z\n"));
        assert!(text.contains("runs-on: ubuntu-latest"));
        assert!(text.contains("- cargo test"));
    }

    #[test]
    fn test_yaml_without_provenance() {
        let generator = DocumentGenerator::new(GenerateOptions {
            provenance: false,
            ..Default::default()
        });

        let text = generator
            .generate(&job(), DocumentKind::Job, Path::new("jobs/build.yml"))
            .unwrap();

        assert!(text.starts_with("runs-on: ubuntu-latest"));
    }

    #[test]
    fn test_json_output() {
        let generator = DocumentGenerator::new(GenerateOptions {
            format: OutputFormat::Json,
            ..Default::default()
        });

        let text = generator
            .generate(&job(), DocumentKind::Job, Path::new("jobs/build.yml"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["runs-on"], "ubuntu-latest");
        assert_eq!(value["steps"][1], "cargo test");
        assert!(!text.starts_with('#'));
    }

    #[test]
    fn test_generate_rejects_invalid() {
        let generator = DocumentGenerator::default();
        let node = Node::mapping([("name", "ci")]);

        let err = generator
            .generate(&node, DocumentKind::Workflow, Path::new("workflows/ci.yml"))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Validation { ref missing_field, .. } if missing_field == "jobs"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("toml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
