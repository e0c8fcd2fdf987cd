//! `hyperdoc-codecs` — per-format translators between wire bytes and the
//! canonical document tree, plus the registry and content negotiation that
//! select one.
//!
//! Decoders: native, HAL, OpenAPI, JSON Hyper-Schema. Encoders: native, HAL.
//! The JSON-Schema bridge in [`jsonschema`] is special: its payload is a
//! validation-engine [`hyperdoc_schema::Schema`], not a document, so it is
//! called by the other codecs rather than registered.

pub mod codec;
pub mod hal;
pub mod hyperschema;
pub mod jsonschema;
pub mod native;
pub mod openapi;
pub mod registry;
pub mod uritemplate;
pub mod urlutil;

pub use codec::{Codec, CodecError, Decoded, EncodeOptions};
pub use hal::HalCodec;
pub use hyperschema::HyperSchemaCodec;
pub use native::NativeCodec;
pub use openapi::OpenApiCodec;
pub use registry::{CodecRegistry, NegotiationError};
