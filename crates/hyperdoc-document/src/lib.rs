//! `hyperdoc-document` — the canonical immutable document tree every wire
//! format is translated to and from, plus the path-addressed
//! structural-update algebra.
//!
//! Trees are built from [`Node`] values: documents, objects, arrays, links,
//! errors, and JSON leaves. Containers are persistent — edits return new
//! containers and share every untouched child with the original.
//!
//! # Example
//!
//! ```
//! use hyperdoc_document::{deep_replace, get_path, path, Document, Node};
//! use indexmap::indexmap;
//!
//! let root = Node::Document(Document::new(
//!     "http://example.com/",
//!     "Pets",
//!     indexmap! {
//!         "count".to_string() => Node::from(2),
//!     },
//! ));
//! let updated = deep_replace(&root, &path!["count"], Node::from(3)).unwrap();
//! assert_eq!(get_path(&updated, &path!["count"]).unwrap(), &Node::from(3));
//! // The original is untouched.
//! assert_eq!(get_path(&root, &path!["count"]).unwrap(), &Node::from(2));
//! ```

pub mod error;
pub mod node;
pub mod path;
pub mod update;

pub use error::{DocumentError, PathError};
pub use node::{
    Array, Document, ErrorNode, Field, FieldLocation, Link, Node, Object, Transform,
};
pub use path::{get_child, get_path, Path, PathSegment};
pub use update::{deep_remove, deep_replace, remove, replace};

// Re-exported so downstream crates share one ordered-map type.
pub use indexmap::IndexMap;
