//! Path addressing: ordered string-or-integer indices into the tree.

use std::fmt;

use crate::error::PathError;
use crate::node::Node;

/// One step of a path: a string key into a mapping or an integer index into
/// an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A path from a root to a node.
pub type Path = Vec<PathSegment>;

/// Build a path from mixed keys/indices.
///
/// ```
/// use hyperdoc_document::path;
///
/// let p = path!["results", 0, "name"];
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::Path::new() };
    ($($segment:expr),+ $(,)?) => {
        vec![$($crate::PathSegment::from($segment)),+]
    };
}

/// One-level child lookup.
///
/// Integer segments index arrays; string segments index the three mapping
/// shapes (documents, objects, errors).
pub fn get_child<'a>(node: &'a Node, segment: &PathSegment) -> Result<&'a Node, PathError> {
    match (node, segment) {
        (Node::Document(doc), PathSegment::Key(key)) => {
            doc.get(key).ok_or_else(|| PathError::KeyNotFound {
                key: key.clone(),
            })
        }
        (Node::Object(obj), PathSegment::Key(key)) => {
            obj.get(key).ok_or_else(|| PathError::KeyNotFound {
                key: key.clone(),
            })
        }
        (Node::Error(err), PathSegment::Key(key)) => {
            err.get(key).ok_or_else(|| PathError::KeyNotFound {
                key: key.clone(),
            })
        }
        (Node::Array(arr), PathSegment::Index(index)) => {
            arr.get(*index).ok_or(PathError::IndexOutOfBounds {
                index: *index,
                len: arr.len(),
            })
        }
        (Node::Array(_), PathSegment::Key(key)) => Err(PathError::KeyIntoArray {
            key: key.clone(),
        }),
        (Node::Document(_) | Node::Object(_) | Node::Error(_), PathSegment::Index(index)) => {
            Err(PathError::IndexIntoMapping { index: *index })
        }
        (other, _) => Err(PathError::NotIndexable {
            kind: other.kind(),
        }),
    }
}

/// Descend from `root` one segment at a time.
pub fn get_path<'a>(root: &'a Node, path: &[PathSegment]) -> Result<&'a Node, PathError> {
    let mut current = root;
    for segment in path {
        current = get_child(current, segment)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Array, Document, Object};
    use indexmap::indexmap;

    fn sample() -> Node {
        Node::Document(Document::new(
            "http://example.com/",
            "Sample",
            indexmap! {
                "results".to_string() => Node::Array(Array::new(vec![
                    Node::Object(Object::new(indexmap! {
                        "name".to_string() => Node::from("first"),
                    })),
                ])),
            },
        ))
    }

    #[test]
    fn descends_mixed_paths() {
        let root = sample();
        let node = get_path(&root, &path!["results", 0, "name"]).unwrap();
        assert_eq!(node, &Node::from("first"));
    }

    #[test]
    fn empty_path_is_root() {
        let root = sample();
        assert!(get_path(&root, &[]).unwrap().ptr_eq(&root));
    }

    #[test]
    fn missing_key() {
        let root = sample();
        assert_eq!(
            get_path(&root, &path!["nope"]),
            Err(PathError::KeyNotFound {
                key: "nope".to_string()
            })
        );
    }

    #[test]
    fn index_into_mapping_is_type_error() {
        let root = sample();
        assert_eq!(
            get_path(&root, &path![0]),
            Err(PathError::IndexIntoMapping { index: 0 })
        );
    }

    #[test]
    fn descend_through_leaf_is_type_error() {
        let root = sample();
        assert_eq!(
            get_path(&root, &path!["results", 0, "name", "x"]),
            Err(PathError::NotIndexable { kind: "string" })
        );
    }
}
