//! Codec registry and content negotiation.
//!
//! The registry is a fixed ordered list supplied at construction; there is no
//! runtime plugin discovery. Negotiation works on parameter-stripped,
//! lowercased media types.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::codec::Codec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
    #[error("no codec satisfies accept header {0:?}")]
    NotAcceptable(String),
}

/// Drop parameters (`; charset=...`), trim, and lowercase one media type.
fn strip_parameters(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// The main type of a `type/subtype` pair.
fn main_type(media_type: &str) -> &str {
    media_type.split('/').next().unwrap_or(media_type)
}

pub struct CodecRegistry {
    codecs: Vec<Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new(codecs: Vec<Arc<dyn Codec>>) -> Self {
        Self { codecs }
    }

    pub fn codecs(&self) -> &[Arc<dyn Codec>] {
        &self.codecs
    }

    fn decoders(&self) -> impl Iterator<Item = &Arc<dyn Codec>> {
        self.codecs.iter().filter(|codec| codec.can_decode())
    }

    fn encoders(&self) -> impl Iterator<Item = &Arc<dyn Codec>> {
        self.codecs.iter().filter(|codec| codec.can_encode())
    }

    /// Select a decoder for a `Content-Type` header value.
    ///
    /// No content type means the first decode-capable codec in registration
    /// order.
    pub fn negotiate_decoder(
        &self,
        content_type: Option<&str>,
    ) -> Result<Arc<dyn Codec>, NegotiationError> {
        let Some(content_type) = content_type.filter(|value| !value.trim().is_empty()) else {
            return self
                .decoders()
                .next()
                .cloned()
                .ok_or_else(|| NegotiationError::UnsupportedContentType(String::new()));
        };
        let media_type = strip_parameters(content_type);
        for codec in self.decoders() {
            if codec.media_types().iter().any(|mt| *mt == media_type) {
                debug!(content_type, codec = codec.name(), "selected decoder");
                return Ok(codec.clone());
            }
        }
        Err(NegotiationError::UnsupportedContentType(media_type))
    }

    /// Select an encoder for an `Accept` header value.
    ///
    /// Match order: exact media type, `type/*` wildcard, then literal `*/*`.
    pub fn negotiate_encoder(
        &self,
        accept: Option<&str>,
    ) -> Result<Arc<dyn Codec>, NegotiationError> {
        let Some(accept) = accept.filter(|value| !value.trim().is_empty()) else {
            return self
                .encoders()
                .next()
                .cloned()
                .ok_or_else(|| NegotiationError::NotAcceptable(String::new()));
        };
        let acceptable: Vec<String> = accept.split(',').map(strip_parameters).collect();

        for codec in self.encoders() {
            if codec
                .media_types()
                .iter()
                .any(|mt| acceptable.iter().any(|range| range == mt))
            {
                debug!(accept, codec = codec.name(), "selected encoder (exact)");
                return Ok(codec.clone());
            }
        }
        for codec in self.encoders() {
            if codec
                .media_types()
                .iter()
                .any(|mt| acceptable.iter().any(|range| {
                    range.strip_suffix("/*").is_some_and(|main| main == main_type(mt))
                }))
            {
                debug!(accept, codec = codec.name(), "selected encoder (wildcard)");
                return Ok(codec.clone());
            }
        }
        if acceptable.iter().any(|range| range == "*/*") {
            if let Some(codec) = self.encoders().next() {
                debug!(accept, codec = codec.name(), "selected encoder (*/*)");
                return Ok(codec.clone());
            }
        }
        Err(NegotiationError::NotAcceptable(accept.to_string()))
    }

    /// Join all decode-capable media types for an outbound `Accept` header.
    pub fn get_accept_header(&self) -> String {
        let types: Vec<&str> = self
            .decoders()
            .flat_map(|codec| codec.media_types().iter().copied())
            .collect();
        types.join(", ")
    }
}
