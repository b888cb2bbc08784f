//! Generic fragment tree.
//!
//! Every fragment parses into a [`Node`]. Three variants mirror plain YAML
//! data; [`Node::Reference`] and [`Node::Inclusion`] are produced from tagged
//! YAML and must be gone once the resolver is done with a tree.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Insertion-ordered mapping with unique string keys.
pub type Mapping = IndexMap<String, Node>;

/// Scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Render the scalar the way it appears when spliced into text.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Replace this node with the resolved content of another fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reference {
    /// Target fragment path as written in the source.
    pub path: String,
    /// Variables overlaid on the environment while resolving the target.
    pub params: Mapping,
}

impl Reference {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Mapping::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Splice the resolved content of another fragment into the current container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inclusion {
    /// Target fragment path as written in the source.
    pub path: String,
    /// Deep-merge mapping content into the enclosing mapping.
    pub merge: bool,
}

impl Inclusion {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            merge: false,
        }
    }

    pub fn merging(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            merge: true,
        }
    }
}

/// A node of a fragment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
    Reference(Reference),
    Inclusion(Inclusion),
}

impl Node {
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// Build a mapping node from key/value pairs, keeping their order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Node>,
        I: IntoIterator<Item = (K, V)>,
    {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Node>,
        I: IntoIterator<Item = V>,
    {
        Node::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// True for empty mappings, empty sequences, null and empty strings.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Scalar(Scalar::Null) => true,
            Node::Scalar(Scalar::String(s)) => s.is_empty(),
            Node::Scalar(_) => false,
            Node::Sequence(items) => items.is_empty(),
            Node::Mapping(m) => m.is_empty(),
            Node::Reference(_) | Node::Inclusion(_) => false,
        }
    }

    /// Short name of the node variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Reference(_) => "reference",
            Node::Inclusion(_) => "inclusion",
        }
    }

    /// True when no Reference or Inclusion remains anywhere in the tree.
    pub fn is_resolved(&self) -> bool {
        self.first_unresolved().is_none()
    }

    /// Location of the first Reference or Inclusion in document order,
    /// written as `jobs.build.steps[2]` (`$` for the root itself).
    pub fn first_unresolved(&self) -> Option<String> {
        fn walk(node: &Node, location: &mut String) -> bool {
            match node {
                Node::Reference(_) | Node::Inclusion(_) => true,
                Node::Scalar(_) => false,
                Node::Sequence(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let len = location.len();
                        location.push_str(&format!("[{}]", index));
                        if walk(item, location) {
                            return true;
                        }
                        location.truncate(len);
                    }
                    false
                }
                Node::Mapping(entries) => {
                    for (key, value) in entries {
                        let len = location.len();
                        if !location.is_empty() {
                            location.push('.');
                        }
                        location.push_str(key);
                        if walk(value, location) {
                            return true;
                        }
                        location.truncate(len);
                    }
                    false
                }
            }
        }

        let mut location = String::new();
        if walk(self, &mut location) {
            if location.is_empty() {
                location.push('$');
            }
            Some(location)
        } else {
            None
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Float(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl From<Reference> for Node {
    fn from(value: Reference) -> Self {
        Node::Reference(value)
    }
}

impl From<Inclusion> for Node {
    fn from(value: Inclusion) -> Self {
        Node::Inclusion(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Node::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Node::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            Node::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            Node::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::Reference(r) => Err(S::Error::custom(format!(
                "unresolved reference to {}",
                r.path
            ))),
            Node::Inclusion(i) => Err(S::Error::custom(format!(
                "unresolved inclusion of {}",
                i.path
            ))),
        }
    }
}
