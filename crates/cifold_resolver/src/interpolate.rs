//! `${dotted.path}` placeholder substitution.

use cifold_fragment::{placeholder_pattern, Node, Scalar};
use regex::Captures;

use crate::variables::Variables;

/// Substitutes placeholders in string scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator;

impl Interpolator {
    pub fn new() -> Self {
        Self
    }

    /// Interpolate a string scalar.
    ///
    /// A string that is exactly one placeholder becomes the variable's value
    /// with its type kept. Otherwise scalar values are spliced in as text.
    /// Undefined placeholders, and non-scalar values inside longer strings,
    /// are left verbatim.
    pub fn interpolate(&self, text: &str, variables: &Variables) -> Node {
        let pattern = placeholder_pattern();

        if let Some(caps) = pattern.captures(text) {
            let whole = caps.get(0).map(|m| m.as_str().len() == text.len()).unwrap_or(false);
            if whole {
                if let Some(value) = variables.lookup(&caps[1]) {
                    return value.clone();
                }
            }
        } else {
            return Node::string(text);
        }

        let rendered = pattern.replace_all(text, |caps: &Captures| match variables.lookup(&caps[1]) {
            Some(Node::Scalar(scalar)) => scalar.render(),
            _ => caps[0].to_string(),
        });
        Node::Scalar(Scalar::String(rendered.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Variables {
        let mut vars = Variables::new();
        vars.set_path("inputs.version", "20");
        vars.set_path("inputs.retries", 3i64);
        vars.set_path("env.CI", true);
        vars.insert("matrix", Node::sequence(["a", "b"]));
        vars
    }

    #[test]
    fn test_missing_placeholder_passes_through() {
        let node = Interpolator::new().interpolate("${inputs.missing}", &Variables::new());
        assert_eq!(node, Node::from("${inputs.missing}"));
    }

    #[test]
    fn test_defined_placeholder_replaced() {
        let mut vars = Variables::new();
        vars.set_path("inputs.missing", "x");
        let node = Interpolator::new().interpolate("${inputs.missing}", &vars);
        assert_eq!(node, Node::from("x"));
    }

    #[test]
    fn test_whole_placeholder_keeps_type() {
        let interpolator = Interpolator::new();
        assert_eq!(interpolator.interpolate("${inputs.retries}", &vars()), Node::from(3i64));
        assert_eq!(
            interpolator.interpolate("${matrix}", &vars()),
            Node::sequence(["a", "b"])
        );
    }

    #[test]
    fn test_partial_interpolation() {
        let node = Interpolator::new().interpolate(
            "node ${inputs.version} retries=${inputs.retries} ci=${env.CI} ${later.value}",
            &vars(),
        );
        assert_eq!(node, Node::from("node 20 retries=3 ci=true ${later.value}"));
    }

    #[test]
    fn test_non_scalar_inside_text_left_verbatim() {
        let node = Interpolator::new().interpolate("targets: ${matrix}", &vars());
        assert_eq!(node, Node::from("targets: ${matrix}"));
    }

    #[test]
    fn test_engine_expressions_untouched() {
        let text = "${{ github.sha }}";
        assert_eq!(Interpolator::new().interpolate(text, &vars()), Node::from(text));
    }
}
