//! The codec boundary: decode bytes into the canonical tree, encode the tree
//! back into bytes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hyperdoc_document::{Document, DocumentError, ErrorNode, Node};

/// Outcome of a successful decode: a document or a decoded error payload.
///
/// A decoded error is a value, not a failure — surfacing it as one is the
/// caller's decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Document(Document),
    Error(ErrorNode),
}

impl Decoded {
    pub fn into_node(self) -> Node {
        match self {
            Decoded::Document(doc) => Node::Document(doc),
            Decoded::Error(err) => Node::Error(err),
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Decoded::Document(doc) => Some(doc),
            Decoded::Error(_) => None,
        }
    }
}

/// Options honored by encoders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Pretty-print with indentation instead of compact output.
    #[serde(default)]
    pub indent: bool,
}

#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed source bytes.
    #[error("malformed payload: {0}")]
    Parse(String),
    /// Decoded content violated a document-model invariant.
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("codec {0} does not support decoding")]
    DecodeUnsupported(&'static str),
    #[error("codec {0} does not support encoding")]
    EncodeUnsupported(&'static str),
    /// The encoder was handed a root node kind it cannot represent.
    #[error("cannot encode a {kind} node at the root")]
    UnsupportedRoot { kind: &'static str },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Parse(err.to_string())
    }
}

/// A translator between one wire format and the canonical tree.
///
/// A codec missing one direction is decode-only or encode-only; the defaults
/// report the direction as unsupported.
pub trait Codec: Send + Sync {
    /// Declared media types. The first entry is the canonical one.
    fn media_types(&self) -> &'static [&'static str];

    fn can_decode(&self) -> bool {
        false
    }

    fn can_encode(&self) -> bool {
        false
    }

    fn decode(&self, _bytes: &[u8], _base_url: Option<&str>) -> Result<Decoded, CodecError> {
        Err(CodecError::DecodeUnsupported(self.name()))
    }

    fn encode(&self, _node: &Node, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::EncodeUnsupported(self.name()))
    }

    /// Canonical media type, used in error messages.
    fn name(&self) -> &'static str {
        self.media_types().first().copied().unwrap_or("unknown")
    }
}
