//! Structural-update algebra: path-addressed remove/replace over the
//! immutable tree.
//!
//! Every operation returns a new container of the same kind. Only the chain
//! of ancestors from the root to the target is rebuilt; every child off the
//! edited path keeps its original allocation (observable via
//! [`Node::ptr_eq`]).

use crate::error::PathError;
use crate::node::{Array, Node};
use crate::path::{get_child, PathSegment};

/// Remove one entry from a single container level.
pub fn remove(container: &Node, segment: &PathSegment) -> Result<Node, PathError> {
    match (container, segment) {
        (Node::Document(doc), PathSegment::Key(key)) => {
            let mut content = doc.content().clone();
            content
                .shift_remove(key)
                .ok_or_else(|| PathError::KeyNotFound { key: key.clone() })?;
            Ok(Node::Document(doc.with_content(content)))
        }
        (Node::Object(obj), PathSegment::Key(key)) => {
            let mut content = obj.content().clone();
            content
                .shift_remove(key)
                .ok_or_else(|| PathError::KeyNotFound { key: key.clone() })?;
            Ok(Node::Object(crate::node::Object::new(content)))
        }
        (Node::Array(arr), PathSegment::Index(index)) => {
            if *index >= arr.len() {
                return Err(PathError::IndexOutOfBounds {
                    index: *index,
                    len: arr.len(),
                });
            }
            let items = arr
                .iter()
                .enumerate()
                .filter(|(i, _)| i != index)
                .map(|(_, node)| node.clone())
                .collect();
            Ok(Node::Array(Array::new(items)))
        }
        (Node::Array(_), PathSegment::Key(key)) => {
            Err(PathError::KeyIntoArray { key: key.clone() })
        }
        (Node::Document(_) | Node::Object(_), PathSegment::Index(index)) => {
            Err(PathError::IndexIntoMapping { index: *index })
        }
        (other, _) => Err(PathError::NotIndexable { kind: other.kind() }),
    }
}

/// Substitute one existing entry at a single container level.
pub fn replace(container: &Node, segment: &PathSegment, value: Node) -> Result<Node, PathError> {
    match (container, segment) {
        (Node::Document(doc), PathSegment::Key(key)) => {
            if !doc.content().contains_key(key) {
                return Err(PathError::KeyNotFound { key: key.clone() });
            }
            let mut content = doc.content().clone();
            // Inserting over an existing key keeps its position.
            content.insert(key.clone(), value);
            Ok(Node::Document(doc.with_content(content)))
        }
        (Node::Object(obj), PathSegment::Key(key)) => {
            if !obj.content().contains_key(key) {
                return Err(PathError::KeyNotFound { key: key.clone() });
            }
            let mut content = obj.content().clone();
            content.insert(key.clone(), value);
            Ok(Node::Object(crate::node::Object::new(content)))
        }
        (Node::Array(arr), PathSegment::Index(index)) => {
            if *index >= arr.len() {
                return Err(PathError::IndexOutOfBounds {
                    index: *index,
                    len: arr.len(),
                });
            }
            let items = arr
                .iter()
                .enumerate()
                .map(|(i, node)| if i == *index { value.clone() } else { node.clone() })
                .collect();
            Ok(Node::Array(Array::new(items)))
        }
        (Node::Array(_), PathSegment::Key(key)) => {
            Err(PathError::KeyIntoArray { key: key.clone() })
        }
        (Node::Document(_) | Node::Object(_), PathSegment::Index(index)) => {
            Err(PathError::IndexIntoMapping { index: *index })
        }
        (other, _) => Err(PathError::NotIndexable { kind: other.kind() }),
    }
}

/// Remove the node at `path`, rebuilding only the ancestor chain.
///
/// Removing the whole tree (`path == []`) yields `None`.
pub fn deep_remove(root: &Node, path: &[PathSegment]) -> Result<Option<Node>, PathError> {
    let Some((segment, rest)) = path.split_first() else {
        return Ok(None);
    };
    deep_remove_inner(root, segment, rest).map(Some)
}

fn deep_remove_inner(
    node: &Node,
    segment: &PathSegment,
    rest: &[PathSegment],
) -> Result<Node, PathError> {
    let Some((next, tail)) = rest.split_first() else {
        return remove(node, segment);
    };
    let child = get_child(node, segment)?;
    let rebuilt = deep_remove_inner(child, next, tail)?;
    replace(node, segment, rebuilt)
}

/// Replace the node at `path`, rebuilding only the ancestor chain.
///
/// Replacing the whole tree (`path == []`) returns `value` itself.
pub fn deep_replace(root: &Node, path: &[PathSegment], value: Node) -> Result<Node, PathError> {
    let Some((segment, rest)) = path.split_first() else {
        return Ok(value);
    };
    let child = get_child(root, segment)?;
    let rebuilt = deep_replace(child, rest, value)?;
    replace(root, segment, rebuilt)
}
