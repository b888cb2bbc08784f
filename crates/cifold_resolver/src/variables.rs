//! Variable environment used for placeholder substitution.

use cifold_fragment::{Mapping, Node};

/// Variables visible while resolving a fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(Mapping);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a value at a dotted path, creating intermediate mappings.
    ///
    /// A non-mapping value on the way is replaced by a mapping.
    pub fn set_path(&mut self, dotted: &str, value: impl Into<Node>) {
        let mut segments = dotted.split('.').peekable();
        let mut current = &mut self.0;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value.into());
                return;
            }

            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Node::Mapping(Mapping::new()));
            if !entry.is_mapping() {
                *entry = Node::Mapping(Mapping::new());
            }
            current = match entry {
                Node::Mapping(m) => m,
                _ => return,
            };
        }
    }

    /// Look up a dotted path such as `inputs.node.version`.
    ///
    /// Numeric segments index into sequences. Null values count as undefined.
    pub fn lookup(&self, dotted: &str) -> Option<&Node> {
        let mut segments = dotted.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;

        for segment in segments {
            current = match current {
                Node::Mapping(m) => m.get(segment)?,
                Node::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Copy of these variables with `params` laid over the top-level keys.
    pub fn overlay(&self, params: &Mapping) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in params {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Deterministic text form used as part of resolution cache keys.
    pub fn fingerprint(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("{:?}", self.0)
        }
    }
}

impl From<Mapping> for Variables {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_nested() {
        let mut vars = Variables::new();
        vars.set_path("inputs.node.version", "20");
        vars.insert("targets", Node::sequence(["linux", "macos"]));

        assert_eq!(vars.lookup("inputs.node.version"), Some(&Node::from("20")));
        assert_eq!(vars.lookup("targets.1"), Some(&Node::from("macos")));
        assert!(vars.lookup("inputs.missing").is_none());
        assert!(vars.lookup("targets.7").is_none());
        assert!(vars.lookup("inputs.node.version.deeper").is_none());
    }

    #[test]
    fn test_null_is_undefined() {
        let mut vars = Variables::new();
        vars.insert("empty", Node::null());
        assert!(vars.lookup("empty").is_none());
    }

    #[test]
    fn test_overlay_does_not_touch_original() {
        let mut vars = Variables::new();
        vars.insert("v", "10");
        vars.insert("keep", "yes");

        let mut params = Mapping::new();
        params.insert("v".to_string(), Node::from("20"));
        let derived = vars.overlay(&params);

        assert_eq!(derived.lookup("v"), Some(&Node::from("20")));
        assert_eq!(derived.lookup("keep"), Some(&Node::from("yes")));
        assert_eq!(vars.lookup("v"), Some(&Node::from("10")));
        assert_ne!(vars.fingerprint(), derived.fingerprint());
    }

    #[test]
    fn test_set_path_replaces_scalar() {
        let mut vars = Variables::new();
        vars.insert("inputs", "scalar");
        vars.set_path("inputs.a", "1");
        assert_eq!(vars.lookup("inputs.a"), Some(&Node::from("1")));
    }
}
