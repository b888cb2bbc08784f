//! Conversion from YAML values into fragment nodes.
//!
//! ## Tag forms
//!
//! | YAML                                  | Node                                   |
//! |---------------------------------------|----------------------------------------|
//! | `!reference jobs/build.yml`           | `Reference { path, params: {} }`       |
//! | `!reference { path: x, params: {..}}` | `Reference { path, params }`           |
//! | `!include steps/setup.yml`            | `Inclusion { path, merge: false }`     |
//! | `!include { path: x, merge: true }`   | `Inclusion { path, merge }`            |
//!
//! `!ref` is accepted as a short alias of `!reference`. Any other tag is an
//! error, since the generated document would silently lose it.

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{FragmentError, FragmentResult};
use crate::node::{Inclusion, Mapping, Node, Reference, Scalar};
use crate::reader::ParsedFragment;

const REFERENCE_TAGS: [&str; 2] = ["reference", "ref"];
const INCLUDE_TAG: &str = "include";

/// Parse fragment text into a node tree plus its declared dependencies.
pub fn parse_fragment(content: &str, path: &Path) -> FragmentResult<ParsedFragment> {
    if content.trim().is_empty() {
        return Ok(ParsedFragment::new(Node::null()));
    }

    let value: Value = serde_yaml::from_str(content).map_err(|source| FragmentError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let mut dependencies = Vec::new();
    let root = convert(value, path, &mut dependencies)?;
    debug!(
        "Parsed {:?} with {} declared dependencies",
        path,
        dependencies.len()
    );

    Ok(ParsedFragment { root, dependencies })
}

/// Convert an already-parsed YAML value, recognizing reference and include tags.
pub fn node_from_yaml(value: Value, path: &Path) -> FragmentResult<Node> {
    let mut dependencies = Vec::new();
    convert(value, path, &mut dependencies)
}

fn convert(value: Value, path: &Path, deps: &mut Vec<String>) -> FragmentResult<Node> {
    Ok(match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Node::Scalar(Scalar::Int(i)),
            None => Node::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) => Node::Scalar(Scalar::String(s)),
        Value::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .map(|item| convert(item, path, deps))
                .collect::<FragmentResult<Vec<_>>>()?,
        ),
        Value::Mapping(entries) => {
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                let key = mapping_key(key, path)?;
                if mapping.contains_key(&key) {
                    return Err(FragmentError::InvalidKey {
                        path: path.to_path_buf(),
                        message: format!("key {:?} appears more than once", key),
                    });
                }
                mapping.insert(key, convert(value, path, deps)?);
            }
            Node::Mapping(mapping)
        }
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!');

            if REFERENCE_TAGS.contains(&tag) {
                let reference = reference(tagged.value, tag, path, deps)?;
                record(deps, &reference.path);
                Node::Reference(reference)
            } else if tag == INCLUDE_TAG {
                let inclusion = inclusion(tagged.value, path)?;
                record(deps, &inclusion.path);
                Node::Inclusion(inclusion)
            } else {
                return Err(invalid_tag(path, tag, "unknown tag"));
            }
        }
    })
}

fn reference(
    value: Value,
    tag: &str,
    path: &Path,
    deps: &mut Vec<String>,
) -> FragmentResult<Reference> {
    match value {
        Value::String(target) => target_path(target, tag, path).map(Reference::new),
        Value::Mapping(entries) => {
            let mut reference = Reference::default();
            let mut has_path = false;

            for (key, value) in entries {
                match key.as_str() {
                    Some("path") => {
                        let target = value
                            .as_str()
                            .ok_or_else(|| invalid_tag(path, tag, "`path` must be a string"))?;
                        reference.path = target_path(target.to_string(), tag, path)?;
                        has_path = true;
                    }
                    Some("params") => match convert(value, path, deps)? {
                        Node::Mapping(params) => reference.params = params,
                        Node::Scalar(Scalar::Null) => {}
                        other => {
                            return Err(invalid_tag(
                                path,
                                tag,
                                &format!("`params` must be a mapping, found {}", other.kind_name()),
                            ))
                        }
                    },
                    _ => {
                        return Err(invalid_tag(
                            path,
                            tag,
                            &format!("unexpected key {:?}", key),
                        ))
                    }
                }
            }

            if !has_path {
                return Err(invalid_tag(path, tag, "missing `path`"));
            }
            Ok(reference)
        }
        _ => Err(invalid_tag(path, tag, "expected a path or a mapping")),
    }
}

fn inclusion(value: Value, path: &Path) -> FragmentResult<Inclusion> {
    match value {
        Value::String(target) => target_path(target, INCLUDE_TAG, path).map(Inclusion::new),
        Value::Mapping(entries) => {
            let mut inclusion = Inclusion::default();
            let mut has_path = false;

            for (key, value) in entries {
                match key.as_str() {
                    Some("path") => {
                        let target = value.as_str().ok_or_else(|| {
                            invalid_tag(path, INCLUDE_TAG, "`path` must be a string")
                        })?;
                        inclusion.path = target_path(target.to_string(), INCLUDE_TAG, path)?;
                        has_path = true;
                    }
                    Some("merge") => {
                        inclusion.merge = value.as_bool().ok_or_else(|| {
                            invalid_tag(path, INCLUDE_TAG, "`merge` must be a boolean")
                        })?;
                    }
                    _ => {
                        return Err(invalid_tag(
                            path,
                            INCLUDE_TAG,
                            &format!("unexpected key {:?}", key),
                        ))
                    }
                }
            }

            if !has_path {
                return Err(invalid_tag(path, INCLUDE_TAG, "missing `path`"));
            }
            Ok(inclusion)
        }
        _ => Err(invalid_tag(path, INCLUDE_TAG, "expected a path or a mapping")),
    }
}

fn target_path(target: String, tag: &str, path: &Path) -> FragmentResult<String> {
    let target = target.trim().to_string();
    if target.is_empty() {
        return Err(invalid_tag(path, tag, "empty path"));
    }
    Ok(target)
}

fn mapping_key(key: Value, path: &Path) -> FragmentResult<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(FragmentError::InvalidKey {
            path: path.to_path_buf(),
            message: format!("keys must be scalars, found {:?}", other),
        }),
    }
}

fn record(deps: &mut Vec<String>, target: &str) {
    if !deps.iter().any(|d| d == target) {
        deps.push(target.to_string());
    }
}

fn invalid_tag(path: &Path, tag: &str, message: &str) -> FragmentError {
    FragmentError::InvalidTag {
        path: path.to_path_buf(),
        tag: tag.to_string(),
        message: message.to_string(),
    }
}
