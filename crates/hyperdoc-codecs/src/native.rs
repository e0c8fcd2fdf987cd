//! The native hypermedia format: canonical reader and writer.
//!
//! An object is typed via the reserved `"_type"` key (document, link, error);
//! out-of-band url/title live under `"_meta"`. Data keys colliding with the
//! reserved names gain one extra leading underscore on encode and lose it on
//! decode. URLs are written relative to the nearest enclosing document's url
//! and resolved against it on decode.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::trace;

use hyperdoc_document::{
    Document, ErrorNode, Field, FieldLocation, Link, Node, Object, Transform,
};

use crate::codec::{Codec, CodecError, Decoded, EncodeOptions};
use crate::jsonschema;
use crate::urlutil::{relativize, resolve};

pub const MEDIA_TYPE: &str = "application/vnd.hyperdoc+json";

fn escaped_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^__+(type|meta)$").expect("static pattern"))
}

fn reserved_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^_+(type|meta)$").expect("static pattern"))
}

/// `_type`/`_meta` (or an already-escaped variant) gains one underscore.
fn escape_key(key: &str) -> String {
    if reserved_key_pattern().is_match(key) {
        format!("_{key}")
    } else {
        key.to_string()
    }
}

/// `__type` → `_type`; plain keys pass through.
fn unescape_key(key: &str) -> String {
    if escaped_key_pattern().is_match(key) {
        key[1..].to_string()
    } else {
        key.to_string()
    }
}

#[derive(Debug, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for NativeCodec {
    fn media_types(&self) -> &'static [&'static str] {
        &[MEDIA_TYPE]
    }

    fn can_decode(&self) -> bool {
        true
    }

    fn can_encode(&self) -> bool {
        true
    }

    fn decode(&self, bytes: &[u8], base_url: Option<&str>) -> Result<Decoded, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let base = base_url.unwrap_or("");
        trace!(base, "decoding native payload");
        match decode_value(&value, base)? {
            Node::Document(doc) => Ok(Decoded::Document(doc)),
            Node::Error(err) => Ok(Decoded::Error(err)),
            other => Err(CodecError::Parse(format!(
                "top-level node must be a document or error, got {}",
                other.kind()
            ))),
        }
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        if !matches!(node, Node::Document(_) | Node::Error(_)) {
            return Err(CodecError::UnsupportedRoot { kind: node.kind() });
        }
        let value = encode_value(node, "");
        let bytes = if options.indent {
            serde_json::to_vec_pretty(&value)
        } else {
            serde_json::to_vec(&value)
        };
        bytes.map_err(CodecError::from)
    }
}

// ── Decode ────────────────────────────────────────────────────────────────

fn decode_value(value: &Value, base_url: &str) -> Result<Node, CodecError> {
    match value {
        Value::Object(map) => match map.get("_type").and_then(Value::as_str) {
            Some("document") => Ok(Node::Document(decode_document(map, base_url)?)),
            Some("link") => Ok(Node::Link(decode_link(map, base_url)?)),
            Some("error") => Ok(Node::Error(decode_error(map, base_url)?)),
            _ => Ok(Node::Object(Object::new(decode_content(map, base_url)?))),
        },
        Value::Array(items) => {
            let nodes = items
                .iter()
                .map(|item| decode_value(item, base_url))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Array(hyperdoc_document::Array::new(nodes)))
        }
        Value::String(s) => Ok(Node::String(s.clone())),
        Value::Number(n) => Ok(decode_number(n)),
        Value::Bool(b) => Ok(Node::Bool(*b)),
        Value::Null => Ok(Node::Null),
    }
}

fn decode_number(n: &serde_json::Number) -> Node {
    if let Some(i) = n.as_i64() {
        Node::Integer(i)
    } else {
        Node::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn meta_str<'a>(map: &'a Map<String, Value>, key: &str) -> &'a str {
    map.get("_meta")
        .and_then(Value::as_object)
        .and_then(|meta| meta.get(key))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn decode_document(map: &Map<String, Value>, base_url: &str) -> Result<Document, CodecError> {
    let url = resolve(base_url, meta_str(map, "url"));
    let title = meta_str(map, "title").to_string();
    // Children resolve against this document's own url.
    let content = decode_content(map, &url)?;
    Ok(Document::new(url, title, content))
}

fn decode_error(map: &Map<String, Value>, base_url: &str) -> Result<ErrorNode, CodecError> {
    let title = meta_str(map, "title").to_string();
    let content = decode_content(map, base_url)?;
    ErrorNode::new(title, content).map_err(CodecError::from)
}

fn decode_content(
    map: &Map<String, Value>,
    base_url: &str,
) -> Result<IndexMap<String, Node>, CodecError> {
    let mut content = IndexMap::new();
    for (key, value) in map {
        if key == "_type" || key == "_meta" {
            continue;
        }
        content.insert(unescape_key(key), decode_value(value, base_url)?);
    }
    Ok(content)
}

fn decode_link(map: &Map<String, Value>, base_url: &str) -> Result<Link, CodecError> {
    let url = resolve(base_url, map.get("url").and_then(Value::as_str).unwrap_or(""));
    let mut link = Link::new(url);
    if let Some(action) = map.get("action").and_then(Value::as_str) {
        link = link.with_action(action);
    }
    if let Some(encoding) = map.get("encoding").and_then(Value::as_str) {
        link = link.with_encoding(encoding);
    }
    if let Some(transform) = map
        .get("transform")
        .and_then(Value::as_str)
        .and_then(Transform::parse)
    {
        link = link.with_transform(transform);
    }
    if let Some(description) = map.get("description").and_then(Value::as_str) {
        link = link.with_description(description);
    }
    if let Some(fields) = map.get("fields").and_then(Value::as_array) {
        let mut decoded = Vec::with_capacity(fields.len());
        for field in fields {
            if let Some(field) = decode_field(field)? {
                decoded.push(field);
            }
        }
        link = link.with_fields(decoded);
    }
    Ok(link)
}

fn decode_field(value: &Value) -> Result<Option<Field>, CodecError> {
    let Some(map) = value.as_object() else {
        return Ok(None);
    };
    let Some(name) = map.get("name").and_then(Value::as_str) else {
        return Ok(None);
    };
    let mut field = Field::new(name)
        .required(map.get("required").and_then(Value::as_bool).unwrap_or(false));
    if let Some(location) = map
        .get("location")
        .and_then(Value::as_str)
        .and_then(FieldLocation::parse)
    {
        field = field.location(location);
    }
    if let Some(description) = map.get("description").and_then(Value::as_str) {
        field = field.description(description);
    }
    if let Some(schema) = map.get("schema") {
        field = field.schema(jsonschema::decode_schema(schema)?);
    }
    Ok(Some(field))
}

// ── Encode ────────────────────────────────────────────────────────────────

fn encode_value(node: &Node, base_url: &str) -> Value {
    match node {
        Node::Document(doc) => {
            let mut map = Map::new();
            map.insert("_type".to_string(), json!("document"));
            let mut meta = Map::new();
            let url = relativize(base_url, doc.url());
            if !url.is_empty() {
                meta.insert("url".to_string(), json!(url));
            }
            if !doc.title().is_empty() {
                meta.insert("title".to_string(), json!(doc.title()));
            }
            if !meta.is_empty() {
                map.insert("_meta".to_string(), Value::Object(meta));
            }
            for (key, child) in doc.iter() {
                map.insert(escape_key(key), encode_value(child, doc.url()));
            }
            Value::Object(map)
        }
        Node::Object(obj) => {
            let mut map = Map::new();
            for (key, child) in obj.iter() {
                map.insert(escape_key(key), encode_value(child, base_url));
            }
            Value::Object(map)
        }
        Node::Array(arr) => {
            Value::Array(arr.iter().map(|item| encode_value(item, base_url)).collect())
        }
        Node::Link(link) => encode_link(link, base_url),
        Node::Error(err) => {
            let mut map = Map::new();
            map.insert("_type".to_string(), json!("error"));
            if !err.title().is_empty() {
                map.insert("_meta".to_string(), json!({"title": err.title()}));
            }
            for (key, child) in err.iter() {
                map.insert(escape_key(key), encode_value(child, base_url));
            }
            Value::Object(map)
        }
        Node::String(s) => json!(s),
        Node::Integer(i) => json!(i),
        Node::Float(f) => json!(f),
        Node::Bool(b) => json!(b),
        Node::Null => Value::Null,
    }
}

fn encode_link(link: &Link, base_url: &str) -> Value {
    let mut map = Map::new();
    map.insert("_type".to_string(), json!("link"));
    let url = relativize(base_url, link.url());
    if !url.is_empty() {
        map.insert("url".to_string(), json!(url));
    }
    if link.action() != "get" {
        map.insert("action".to_string(), json!(link.action()));
    }
    if !link.encoding().is_empty() {
        map.insert("encoding".to_string(), json!(link.encoding()));
    }
    if let Some(transform) = link.transform() {
        map.insert("transform".to_string(), json!(transform.as_str()));
    }
    if !link.description().is_empty() {
        map.insert("description".to_string(), json!(link.description()));
    }
    if !link.fields().is_empty() {
        let fields: Vec<Value> = link.fields().iter().map(encode_field).collect();
        map.insert("fields".to_string(), Value::Array(fields));
    }
    Value::Object(map)
}

fn encode_field(field: &Field) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), json!(field.name));
    if field.required {
        map.insert("required".to_string(), json!(true));
    }
    if let Some(location) = field.location {
        map.insert("location".to_string(), json!(location.as_str()));
    }
    if !field.description.is_empty() {
        map.insert("description".to_string(), json!(field.description));
    }
    if let Some(schema) = &field.schema {
        map.insert("schema".to_string(), jsonschema::encode_schema(schema));
    }
    Value::Object(map)
}
