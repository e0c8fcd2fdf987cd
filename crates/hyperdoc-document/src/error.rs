//! Construction and path-navigation errors.

use thiserror::Error;

/// Node construction violated a model invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("error nodes may not contain link values")]
    LinkInsideError,
    #[error("error nodes may not contain nested documents")]
    DocumentInsideError,
}

/// Path lookup or structural-update misuse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot index into a {kind} node")]
    NotIndexable { kind: &'static str },
    #[error("key {key:?} not found")]
    KeyNotFound { key: String },
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("arrays are indexed by integer, got key {key:?}")]
    KeyIntoArray { key: String },
    #[error("mappings are indexed by string, got index {index}")]
    IndexIntoMapping { index: usize },
}
