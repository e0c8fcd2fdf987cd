//! `hyperdoc-schema` — declarative schema descriptors with JSON-Schema-like
//! validation semantics.
//!
//! A schema is a plain immutable value: a struct of constraint fields built
//! with chainable setters. Validation is a pure function from a JSON value to
//! either a coerced value or a [`ValidationError`] whose detail aggregates
//! every failing sibling at a container level.
//!
//! # Example
//!
//! ```
//! use hyperdoc_schema::{ObjectSchema, Schema, StringSchema};
//! use serde_json::json;
//!
//! let schema = Schema::Object(
//!     ObjectSchema::new()
//!         .property("name", Schema::String(StringSchema::new().min_length(1)))
//!         .required(["name"]),
//! );
//!
//! assert!(schema.validate(&json!({"name": "spam"})).is_ok());
//! let err = schema.validate(&json!({})).unwrap_err();
//! assert_eq!(err.to_string(), r#"{"name": "This field is required."}"#);
//! ```

pub mod error;
pub mod messages;
pub mod schema;
mod validate;

pub use error::{ErrorDetail, ValidationError};
pub use schema::{
    Additional, AnySchema, ArraySchema, BooleanSchema, EnumSchema, IntegerSchema, Items,
    NumberSchema, ObjectSchema, Schema, SchemaBase, StringSchema, UnionSchema,
};
