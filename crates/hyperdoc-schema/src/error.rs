//! Validation error type and its nested detail tree.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

/// Detail of a validation failure.
///
/// Either a single message, or a mapping from property name / array index to
/// the nested detail for that child. Container-level validation collects one
/// entry per failing sibling, so a single error value can describe every
/// problem found at that level.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    Message(String),
    Map(IndexMap<String, ErrorDetail>),
}

impl ErrorDetail {
    pub fn message(text: impl Into<String>) -> Self {
        ErrorDetail::Message(text.into())
    }

    /// Flatten the detail tree into `(path, message)` pairs, where `path` is
    /// the chain of keys/indices leading to each leaf message.
    pub fn flatten(&self) -> Vec<(Vec<String>, String)> {
        let mut out = Vec::new();
        self.flatten_into(&mut Vec::new(), &mut out);
        out
    }

    fn flatten_into(&self, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, String)>) {
        match self {
            ErrorDetail::Message(text) => out.push((prefix.clone(), text.clone())),
            ErrorDetail::Map(entries) => {
                for (key, detail) in entries {
                    prefix.push(key.clone());
                    detail.flatten_into(prefix, out);
                    prefix.pop();
                }
            }
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Message(text) => write!(f, "{text}"),
            ErrorDetail::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, detail)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match detail {
                        ErrorDetail::Message(text) => write!(f, "{key:?}: {text:?}")?,
                        nested => write!(f, "{key:?}: {nested}")?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

/// A schema constraint failure carrying the aggregated [`ErrorDetail`] tree.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{detail}")]
pub struct ValidationError {
    pub detail: ErrorDetail,
}

impl ValidationError {
    pub fn new(detail: ErrorDetail) -> Self {
        Self { detail }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::new(ErrorDetail::message(text))
    }
}
