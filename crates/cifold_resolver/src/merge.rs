//! Deep merge of resolved nodes.
//!
//! - mapping + mapping: union of keys, target order first, shared keys merged
//! - sequence + sequence: target elements followed by source elements
//! - anything else: source replaces target
//!
//! Inputs are never modified.

use cifold_fragment::{Mapping, Node};

/// Merge `source` into `target`, returning a new node.
pub fn merge(target: &Node, source: &Node) -> Node {
    match (target, source) {
        (Node::Mapping(target), Node::Mapping(source)) => Node::Mapping(merge_mappings(target, source)),
        (Node::Sequence(target), Node::Sequence(source)) => {
            let mut items = Vec::with_capacity(target.len() + source.len());
            items.extend(target.iter().cloned());
            items.extend(source.iter().cloned());
            Node::Sequence(items)
        }
        (_, source) => source.clone(),
    }
}

/// Fold layers left to right; later layers win.
pub fn merge_all<'a, I>(layers: I) -> Option<Node>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut layers = layers.into_iter();
    let first = layers.next()?.clone();
    Some(layers.fold(first, |acc, layer| merge(&acc, layer)))
}

fn merge_mappings(target: &Mapping, source: &Mapping) -> Mapping {
    let mut merged = target.clone();
    for (key, value) in source {
        let combined = match merged.get(key) {
            Some(existing) => merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}
