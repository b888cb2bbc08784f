//! Structural validation of resolved documents.
//!
//! Only the minimum needed to catch broken compositions is checked here:
//! required top-level fields per document kind, the root shape, and that no
//! Reference or Inclusion survived resolution. Full schema validation of the
//! target CI system is left to its own tooling.

use std::collections::HashMap;
use std::path::Path;

use cifold_fragment::{placeholders, Node};

use crate::error::{GeneratorError, GeneratorResult};
use crate::kind::DocumentKind;

/// Validation result with details.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Required top-level fields per document kind.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    required: HashMap<DocumentKind, Vec<String>>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValidationRules {
    /// No required fields for any kind.
    pub fn empty() -> Self {
        Self {
            required: HashMap::new(),
        }
    }

    /// Workflows need `jobs`, jobs need `steps`.
    pub fn standard() -> Self {
        Self::empty()
            .require(DocumentKind::Workflow, "jobs")
            .require(DocumentKind::Job, "steps")
    }

    /// Add a required non-empty top-level field for `kind`.
    pub fn require(mut self, kind: DocumentKind, field: impl Into<String>) -> Self {
        let field = field.into();
        let fields = self.required.entry(kind).or_default();
        if !fields.contains(&field) {
            fields.push(field);
        }
        self
    }

    pub fn required(&self, kind: DocumentKind) -> &[String] {
        self.required.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug)]
enum Issue {
    Unresolved(String),
    Shape(String),
    Missing(String),
}

/// Validates resolved documents against [`ValidationRules`].
#[derive(Debug, Clone, Default)]
pub struct DocumentValidator {
    rules: ValidationRules,
}

impl DocumentValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Fail on the first structural problem.
    pub fn check(&self, node: &Node, kind: DocumentKind, path: &Path) -> GeneratorResult<()> {
        match self.issues(node, kind).into_iter().next() {
            None => Ok(()),
            Some(Issue::Unresolved(location)) => Err(GeneratorError::Unresolved {
                path: path.to_path_buf(),
                location,
            }),
            Some(Issue::Shape(message)) => Err(GeneratorError::InvalidShape {
                path: path.to_path_buf(),
                message,
            }),
            Some(Issue::Missing(field)) => Err(GeneratorError::Validation {
                path: path.to_path_buf(),
                missing_field: field,
            }),
        }
    }

    /// Collect every problem, plus warnings for placeholders nobody filled.
    pub fn validate(&self, node: &Node, kind: DocumentKind) -> ValidationResult {
        let mut result = ValidationResult::new();

        for issue in self.issues(node, kind) {
            match issue {
                Issue::Unresolved(location) => {
                    result.add_error(format!("Unresolved reference or inclusion at {}", location))
                }
                Issue::Shape(message) => result.add_error(message),
                Issue::Missing(field) => {
                    result.add_error(format!("Missing required field `{}`", field))
                }
            }
        }

        let mut names = Vec::new();
        collect_placeholders(node, &mut names);
        for placeholder in names {
            result.add_warning(format!("Unresolved placeholder ${{{}}}", placeholder));
        }

        result
    }

    fn issues(&self, node: &Node, kind: DocumentKind) -> Vec<Issue> {
        let mut issues = Vec::new();

        if let Some(location) = node.first_unresolved() {
            issues.push(Issue::Unresolved(location));
            return issues;
        }

        match kind {
            DocumentKind::StepSequence => match node {
                Node::Sequence(steps) if !steps.is_empty() => {}
                Node::Sequence(_) => issues.push(Issue::Shape("Step sequence is empty".into())),
                other => issues.push(Issue::Shape(format!(
                    "Expected a step sequence, found a {}",
                    other.kind_name()
                ))),
            },
            DocumentKind::Workflow | DocumentKind::Job => {
                if !node.is_mapping() {
                    issues.push(Issue::Shape(format!(
                        "Expected a {} mapping, found a {}",
                        kind,
                        node.kind_name()
                    )));
                    return issues;
                }
            }
        }

        for field in self.rules.required(kind) {
            match node.get(field) {
                Some(value) if !value.is_empty() => {}
                _ => issues.push(Issue::Missing(field.clone())),
            }
        }

        issues
    }
}

fn collect_placeholders(node: &Node, out: &mut Vec<String>) {
    match node {
        Node::Scalar(_) => {
            if let Some(text) = node.as_str() {
                for name in placeholders(text) {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
            }
        }
        Node::Sequence(items) => items.iter().for_each(|item| collect_placeholders(item, out)),
        Node::Mapping(entries) => entries
            .values()
            .for_each(|value| collect_placeholders(value, out)),
        Node::Reference(_) | Node::Inclusion(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cifold_fragment::Reference;

    fn workflow(jobs: Node) -> Node {
        Node::mapping([("name", Node::from("ci")), ("jobs", jobs)])
    }

    #[test]
    fn test_valid_workflow() {
        let node = workflow(Node::mapping([(
            "build",
            Node::mapping([("steps", Node::sequence(["make"]))]),
        )]));
        let result = DocumentValidator::default().validate(&node, DocumentKind::Workflow);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_workflow_with_empty_jobs() {
        let node = workflow(Node::Mapping(Default::default()));
        let err = DocumentValidator::default()
            .check(&node, DocumentKind::Workflow, Path::new("/tpl/workflows/ci.yml"))
            .unwrap_err();

        match err {
            GeneratorError::Validation { path, missing_field } => {
                assert_eq!(path, Path::new("/tpl/workflows/ci.yml"));
                assert_eq!(missing_field, "jobs");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_job_requires_steps() {
        let node = Node::mapping([("runs-on", "ubuntu-latest")]);
        let result = DocumentValidator::default().validate(&node, DocumentKind::Job);
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Missing required field `steps`"]);
    }

    #[test]
    fn test_step_sequence_shape() {
        let validator = DocumentValidator::default();
        let path = Path::new("steps/setup.yml");

        assert!(validator
            .check(&Node::sequence(["checkout"]), DocumentKind::StepSequence, path)
            .is_ok());
        assert!(matches!(
            validator.check(&Node::mapping([("a", "b")]), DocumentKind::StepSequence, path),
            Err(GeneratorError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ValidationRules::standard().require(DocumentKind::Workflow, "on");
        let node = workflow(Node::mapping([("build", Node::mapping([("steps", Node::sequence(["x"]))]))]));

        let result = DocumentValidator::new(rules).validate(&node, DocumentKind::Workflow);
        assert_eq!(result.errors, vec!["Missing required field `on`"]);
    }

    #[test]
    fn test_unresolved_node_reported() {
        let node = workflow(Node::mapping([("build", Node::from(Reference::new("jobs/build.yml")))]));
        let err = DocumentValidator::default()
            .check(&node, DocumentKind::Workflow, Path::new("ci.yml"))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Unresolved { ref location, .. } if location == "jobs.build"));
    }

    #[test]
    fn test_placeholder_warnings() {
        let node = Node::mapping([(
            "steps",
            Node::sequence(["echo ${inputs.name}", "echo ${{ github.sha }}"]),
        )]);
        let result = DocumentValidator::default().validate(&node, DocumentKind::Job);
        assert!(result.valid);
        assert_eq!(result.warnings, vec!["Unresolved placeholder ${inputs.name}"]);
    }

    #[test]
    fn test_repeated_placeholder_warned_once() {
        let node = Node::mapping([
            ("runs-on", Node::from("${runner}")),
            ("steps", Node::sequence(["echo ${runner}", "echo ${org} ${runner}"])),
        ]);
        let result = DocumentValidator::default().validate(&node, DocumentKind::Job);
        assert_eq!(
            result.warnings,
            vec!["Unresolved placeholder ${runner}", "Unresolved placeholder ${org}"]
        );
    }
}
