//! The transport boundary.
//!
//! The core never performs I/O: activating a link hands the network call to
//! an external [`Transport`], which performs exactly one blocking request per
//! transition and owns any retry or timeout policy. The ancestor chain
//! carries everything needed to splice an in-place result back into the
//! originating tree.

use thiserror::Error;

use hyperdoc_codecs::{CodecError, Decoded, NegotiationError};
use hyperdoc_document::{deep_replace, Document, Link, Node, Path, PathError, Transform};
use indexmap::IndexMap;
use serde_json::Value;

/// One step of the chain from a root document down to a link: the document
/// and the path from it to the node being transitioned.
#[derive(Debug, Clone)]
pub struct Ancestor {
    pub document: Document,
    pub path: Path,
}

impl Ancestor {
    pub fn new(document: Document, path: Path) -> Self {
        Self { document, path }
    }
}

/// Parameter values supplied for a link's fields.
pub type Params = IndexMap<String, Value>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Performs the one network call behind a transition and decodes the
/// response through the codec registry.
pub trait Transport {
    fn transition(
        &self,
        link: &Link,
        params: &Params,
        ancestors: &[Ancestor],
    ) -> Result<Decoded, TransportError>;
}

/// Replace the subtree addressed by the ancestor chain with `result`,
/// rebuilding each ancestor document from innermost to outermost.
pub fn splice(result: Node, ancestors: &[Ancestor]) -> Result<Node, PathError> {
    let mut node = result;
    for ancestor in ancestors.iter().rev() {
        let root = Node::Document(ancestor.document.clone());
        node = deep_replace(&root, &ancestor.path, node)?;
    }
    Ok(node)
}

/// Activate a link through a transport and apply its transform: an inline
/// transform splices the result into the originating tree, anything else
/// returns the fresh detached tree.
pub fn activate(
    transport: &dyn Transport,
    link: &Link,
    params: &Params,
    ancestors: &[Ancestor],
) -> Result<Node, TransportError> {
    let result = transport.transition(link, params, ancestors)?.into_node();
    match link.transform() {
        Some(Transform::Inline) if !ancestors.is_empty() => {
            splice(result, ancestors).map_err(TransportError::from)
        }
        _ => Ok(result),
    }
}
