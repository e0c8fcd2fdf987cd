//! `hyperdoc` — consume and manipulate hypermedia APIs described in
//! competing wire formats through one canonical, immutable document tree.
//!
//! Inbound bytes plus a declared media type go through [`CodecRegistry`]
//! negotiation to a codec, whose decode yields a [`Document`] (or a decoded
//! [`ErrorNode`]). The application traverses the tree, and when it triggers
//! a [`Link`] an external [`Transport`] performs the network call; the
//! result re-enters the same decode path and may be spliced back into the
//! original tree with the structural-update algebra.
//!
//! # Example
//!
//! ```
//! use hyperdoc::{default_registry, Codec};
//!
//! let registry = default_registry();
//! let codec = registry
//!     .negotiate_decoder(Some("application/hal+json; charset=utf-8"))
//!     .unwrap();
//! let decoded = codec
//!     .decode(br#"{"_links": {"self": {"href": "/api/"}}, "version": 1}"#,
//!             Some("http://example.com/"))
//!     .unwrap();
//! let doc = decoded.as_document().unwrap();
//! assert_eq!(doc.url(), "http://example.com/api/");
//! ```

pub mod transport;

use std::sync::Arc;

pub use hyperdoc_codecs::{
    Codec, CodecError, CodecRegistry, Decoded, EncodeOptions, HalCodec, HyperSchemaCodec,
    NativeCodec, NegotiationError, OpenApiCodec,
};
pub use hyperdoc_document::{
    deep_remove, deep_replace, get_child, get_path, remove, replace, Array, Document,
    DocumentError, ErrorNode, Field, FieldLocation, IndexMap, Link, Node, Object, Path,
    PathError, PathSegment, Transform,
};
pub use hyperdoc_document::path;
pub use hyperdoc_schema::{
    Additional, AnySchema, ArraySchema, BooleanSchema, EnumSchema, ErrorDetail, IntegerSchema,
    Items, NumberSchema, ObjectSchema, Schema, SchemaBase, StringSchema, UnionSchema,
    ValidationError,
};
pub use transport::{activate, splice, Ancestor, Params, Transport, TransportError};

/// The stock registry: native first (it is the preferred decoder and
/// encoder), then HAL, OpenAPI, and JSON Hyper-Schema.
pub fn default_registry() -> CodecRegistry {
    CodecRegistry::new(vec![
        Arc::new(NativeCodec::new()),
        Arc::new(HalCodec::new()),
        Arc::new(OpenApiCodec::new()),
        Arc::new(HyperSchemaCodec::new()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_order() {
        let registry = default_registry();
        assert_eq!(
            registry.get_accept_header(),
            "application/vnd.hyperdoc+json, application/hal+json, \
             application/vnd.oai.openapi+json, application/openapi+json, \
             application/schema+json"
        );
        let decoder = registry.negotiate_decoder(None).unwrap();
        assert_eq!(decoder.name(), "application/vnd.hyperdoc+json");
        let encoder = registry.negotiate_encoder(None).unwrap();
        assert_eq!(encoder.name(), "application/vnd.hyperdoc+json");
    }

    #[test]
    fn openapi_negotiates_by_either_media_type() {
        let registry = default_registry();
        for media in ["application/vnd.oai.openapi+json", "application/openapi+json"] {
            let codec = registry.negotiate_decoder(Some(media)).unwrap();
            assert_eq!(codec.name(), "application/vnd.oai.openapi+json");
        }
    }
}
