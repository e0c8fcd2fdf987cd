//! JSON Hyper-Schema reader (decode only).
//!
//! Local fragment `$ref` pointers are resolved before nested `properties`
//! are read. Each `links[]` entry carrying a `rel` becomes a [`Link`]; URI
//! template variables in `href` become path fields with pointer-shaped
//! tokens flattened into single identifiers.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use hyperdoc_document::{Document, Field, FieldLocation, Link, Node};

use crate::codec::{Codec, CodecError, Decoded, EncodeOptions};
use crate::jsonschema;
use crate::uritemplate::{flatten_identifier, variables};
use crate::urlutil::resolve;

pub const MEDIA_TYPE: &str = "application/schema+json";

#[derive(Debug, Default)]
pub struct HyperSchemaCodec;

impl HyperSchemaCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for HyperSchemaCodec {
    fn media_types(&self) -> &'static [&'static str] {
        &[MEDIA_TYPE]
    }

    fn can_decode(&self) -> bool {
        true
    }

    fn decode(&self, bytes: &[u8], base_url: Option<&str>) -> Result<Decoded, CodecError> {
        let root: Value = serde_json::from_slice(bytes)?;
        let Some(map) = root.as_object() else {
            return Err(CodecError::Parse(
                "hyper-schema payload must be a JSON object".to_string(),
            ));
        };
        let base = base_url.unwrap_or("");
        trace!(base, "decoding hyper-schema payload");

        let title = map
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut content: IndexMap<String, Node> = IndexMap::new();
        if let Some(links) = map.get("links").and_then(Value::as_array) {
            for entry in links {
                let Some(entry) = entry.as_object() else {
                    continue;
                };
                let Some(rel) = entry.get("rel").and_then(Value::as_str) else {
                    continue;
                };
                let key = if rel == "self" { "read" } else { rel };
                let link = decode_link(&root, entry, base)?;
                content.insert(key.to_string(), Node::Link(link));
            }
        }

        Ok(Decoded::Document(Document::new(base, title, content)))
    }

    fn encode(&self, _node: &Node, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::EncodeUnsupported(self.name()))
    }
}

/// Follow a local fragment `$ref` (`#/a/b`); anything else passes through.
fn deref<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
        return value;
    };
    let Some(pointer) = reference.strip_prefix("#/") else {
        return value;
    };
    let mut current = root;
    for segment in pointer.split('/') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return value,
        }
    }
    current
}

fn decode_link(
    root: &Value,
    entry: &Map<String, Value>,
    base: &str,
) -> Result<Link, CodecError> {
    let href = entry.get("href").and_then(Value::as_str).unwrap_or("");
    let mut link = Link::new(resolve(base, href));
    if let Some(method) = entry.get("method").and_then(Value::as_str) {
        link = link.with_action(method.to_lowercase());
    }
    if let Some(enc_type) = entry.get("encType").and_then(Value::as_str) {
        link = link.with_encoding(enc_type);
    }
    if let Some(description) = entry.get("description").and_then(Value::as_str) {
        link = link.with_description(description);
    }

    let mut fields: Vec<Field> = Vec::new();
    for token in variables(href) {
        let name = flatten_identifier(&token);
        if name.is_empty() {
            continue;
        }
        fields.push(Field::new(name).required(true).location(FieldLocation::Path));
    }

    if let Some(schema) = entry.get("schema") {
        let schema = deref(root, schema);
        let properties = schema.get("properties").and_then(Value::as_object);
        let is_object = properties.is_some()
            || schema.get("type").and_then(Value::as_str) == Some("object");
        if is_object {
            let required: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            if let Some(properties) = properties {
                for (name, property) in properties {
                    if fields.iter().any(|field| &field.name == name) {
                        continue;
                    }
                    let property = deref(root, property);
                    let field = Field::new(name)
                        .required(required.contains(&name.as_str()))
                        .schema(jsonschema::decode_schema(property)?);
                    fields.push(field);
                }
            }
        }
    }

    Ok(link.with_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value, base: Option<&str>) -> Document {
        let codec = HyperSchemaCodec::new();
        let bytes = serde_json::to_vec(&value).unwrap();
        codec
            .decode(&bytes, base)
            .unwrap()
            .as_document()
            .unwrap()
            .clone()
    }

    #[test]
    fn self_rel_renames_to_read() {
        let doc = decode(
            json!({
                "title": "Notes",
                "links": [
                    {"rel": "self", "href": "/notes"},
                    {"rel": "create", "href": "/notes", "method": "POST"}
                ]
            }),
            Some("http://api.example.com/"),
        );
        assert_eq!(doc.title(), "Notes");
        let read = doc.get("read").unwrap().as_link().unwrap();
        assert_eq!(read.url(), "http://api.example.com/notes");
        assert_eq!(read.action(), "get");
        let create = doc.get("create").unwrap().as_link().unwrap();
        assert_eq!(create.action(), "post");
    }

    #[test]
    fn template_variables_become_flattened_path_fields() {
        let doc = decode(
            json!({
                "links": [{
                    "rel": "read",
                    "href": "/addresses/{(#/definitions/address/properties/street)}"
                }]
            }),
            None,
        );
        let link = doc.get("read").unwrap().as_link().unwrap();
        assert_eq!(link.fields().len(), 1);
        let field = &link.fields()[0];
        assert_eq!(field.name, "address_properties_street");
        assert!(field.required);
        assert_eq!(field.location, Some(FieldLocation::Path));
    }

    #[test]
    fn ref_resolves_before_properties() {
        let doc = decode(
            json!({
                "definitions": {
                    "note": {
                        "type": "object",
                        "properties": {
                            "text": {"type": "string"},
                            "done": {"type": "boolean"}
                        },
                        "required": ["text"]
                    }
                },
                "links": [{
                    "rel": "create",
                    "href": "/notes",
                    "method": "POST",
                    "schema": {"$ref": "#/definitions/note"}
                }]
            }),
            None,
        );
        let link = doc.get("create").unwrap().as_link().unwrap();
        let names: Vec<&str> = link.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["text", "done"]);
        assert!(link.fields()[0].required);
        assert!(!link.fields()[1].required);
        // Non-path fields defer their location to the action verb.
        assert_eq!(link.fields()[0].location, None);
    }

    #[test]
    fn encoding_from_enc_type() {
        let doc = decode(
            json!({
                "links": [{
                    "rel": "create",
                    "href": "/upload",
                    "method": "POST",
                    "encType": "multipart/form-data"
                }]
            }),
            None,
        );
        let link = doc.get("create").unwrap().as_link().unwrap();
        assert_eq!(link.encoding(), "multipart/form-data");
    }
}
