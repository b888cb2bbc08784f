//! `${dotted.path}` placeholder syntax shared by interpolation and validation.

use std::sync::OnceLock;

use regex::Regex;

/// Matches `${name}` and `${a.b-c.d}`; group 1 is the dotted name.
///
/// `${{ expr }}` of the target engine never matches: `{` is not a name character.
pub fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_-]*(?:\.[A-Za-z0-9_-]+)*)\}")
            .expect("placeholder pattern is valid")
    })
}

/// Placeholder names in `text`, in order of first appearance, without repeats.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(text) {
        if !names.iter().any(|n| n == &caps[1]) {
            names.push(caps[1].to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_listed_once() {
        assert_eq!(
            placeholders("${a.b} and ${c} then ${a.b}"),
            vec!["a.b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_engine_expressions_ignored() {
        assert!(placeholders("${{ github.sha }} and $HOME and ${1x}").is_empty());
        assert_eq!(placeholders("${inputs.node-version}"), vec!["inputs.node-version"]);
    }
}
