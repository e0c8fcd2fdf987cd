//! HAL (`application/hal+json`) reader and writer.
//!
//! Links live under `_links` keyed by rel, nested resources under
//! `_embedded`, everything else is plain state. Rels are mapped to canonical
//! keys: the tail segment of a fully-qualified rel URL, the part after the
//! curie prefix, or the rel unchanged.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::trace;

use hyperdoc_document::{Array, Document, Field, FieldLocation, Link, Node, Object};

use crate::codec::{Codec, CodecError, Decoded, EncodeOptions};
use crate::uritemplate;
use crate::urlutil::resolve;

pub const MEDIA_TYPE: &str = "application/hal+json";

#[derive(Debug, Default)]
pub struct HalCodec;

impl HalCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for HalCodec {
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
        let Some(map) = value.as_object() else {
            return Err(CodecError::Parse(
                "HAL payload must be a JSON object".to_string(),
            ));
        };
        let base = base_url.unwrap_or("");
        trace!(base, "decoding HAL payload");
        Ok(Decoded::Document(decode_document(map, base)?))
    }

    fn encode(&self, node: &Node, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        let Node::Document(doc) = node else {
            return Err(CodecError::UnsupportedRoot { kind: node.kind() });
        };
        let value = encode_document(doc);
        let bytes = if options.indent {
            serde_json::to_vec_pretty(&value)
        } else {
            serde_json::to_vec(&value)
        };
        bytes.map_err(CodecError::from)
    }
}

/// Map a HAL rel onto a canonical content key.
fn transform_rel(rel: &str) -> String {
    if rel.contains("://") {
        let trimmed = rel.trim_end_matches('/');
        return trimmed
            .rsplit('/')
            .next()
            .unwrap_or(trimmed)
            .to_string();
    }
    if let Some((_, tail)) = rel.split_once(':') {
        return tail.to_string();
    }
    rel.to_string()
}

// ── Decode ────────────────────────────────────────────────────────────────

fn decode_document(map: &Map<String, Value>, base_url: &str) -> Result<Document, CodecError> {
    let links = map.get("_links").and_then(Value::as_object);
    let self_link = links
        .and_then(|links| links.get("self"))
        .and_then(Value::as_object);
    let self_href = self_link
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let url = resolve(base_url, self_href);
    let title = self_link
        .and_then(|link| link.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let mut content: IndexMap<String, Node> = IndexMap::new();

    if let Some(links) = links {
        for (rel, value) in links {
            if rel == "self" || rel == "curies" {
                continue;
            }
            content.insert(transform_rel(rel), decode_rel_value(value, &url));
        }
    }

    for (key, value) in map {
        if key == "_links" || key == "_embedded" {
            continue;
        }
        content.insert(key.clone(), plain_to_node(value));
    }

    if let Some(embedded) = map.get("_embedded").and_then(Value::as_object) {
        for (rel, value) in embedded {
            let key = transform_rel(rel);
            let node = match value {
                Value::Object(nested) => Node::Document(decode_document(nested, &url)?),
                Value::Array(items) => {
                    let mut docs = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Object(nested) => {
                                docs.push(Node::Document(decode_document(nested, &url)?));
                            }
                            other => docs.push(plain_to_node(other)),
                        }
                    }
                    Node::Array(Array::new(docs))
                }
                other => plain_to_node(other),
            };
            content.insert(key, node);
        }
    }

    Ok(Document::new(url, title, content))
}

/// A rel maps to a single link, an ordered list of links, or (when every
/// item carries a `name`) a name-keyed mapping of links.
fn decode_rel_value(value: &Value, base_url: &str) -> Node {
    match value {
        Value::Object(map) => Node::Link(decode_link(map, base_url)),
        Value::Array(items) => {
            let objects: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();
            let all_named = objects.len() == items.len()
                && !objects.is_empty()
                && objects
                    .iter()
                    .all(|item| item.get("name").and_then(Value::as_str).is_some());
            if all_named {
                let mut named = IndexMap::new();
                for item in &objects {
                    let name = item
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    named.insert(name, Node::Link(decode_link(item, base_url)));
                }
                Node::Object(Object::new(named))
            } else {
                Node::Array(Array::new(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(map) => Node::Link(decode_link(map, base_url)),
                            other => plain_to_node(other),
                        })
                        .collect(),
                ))
            }
        }
        other => plain_to_node(other),
    }
}

fn decode_link(map: &Map<String, Value>, base_url: &str) -> Link {
    let href = map.get("href").and_then(Value::as_str).unwrap_or("");
    let mut link = Link::new(resolve(base_url, href));
    if let Some(title) = map.get("title").and_then(Value::as_str) {
        link = link.with_description(title);
    }
    let templated = map
        .get("templated")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if templated {
        let fields = uritemplate::variables(href)
            .into_iter()
            .map(|name| Field::new(name).required(true).location(FieldLocation::Path))
            .collect();
        link = link.with_fields(fields);
    }
    link
}

/// Decode plain state (no link semantics).
fn plain_to_node(value: &Value) -> Node {
    match value {
        Value::Object(map) => {
            let mut content = IndexMap::new();
            for (key, child) in map {
                content.insert(key.clone(), plain_to_node(child));
            }
            Node::Object(Object::new(content))
        }
        Value::Array(items) => Node::Array(Array::new(items.iter().map(plain_to_node).collect())),
        Value::String(s) => Node::String(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Node::Integer(i)
            } else {
                Node::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::Bool(b) => Node::Bool(*b),
        Value::Null => Node::Null,
    }
}

// ── Encode ────────────────────────────────────────────────────────────────

fn encode_document(doc: &Document) -> Value {
    let mut links = Map::new();
    let mut self_link = Map::new();
    self_link.insert("href".to_string(), json!(doc.url()));
    if !doc.title().is_empty() {
        self_link.insert("title".to_string(), json!(doc.title()));
    }
    links.insert("self".to_string(), Value::Object(self_link));

    let mut data = Map::new();
    let mut embedded = Map::new();

    for (key, child) in doc.iter() {
        match child {
            Node::Link(link) => {
                links.insert(key.clone(), encode_link(link, None));
            }
            Node::Array(arr) if !arr.is_empty() && arr.iter().all(is_link) => {
                let items: Vec<Value> = arr
                    .iter()
                    .filter_map(Node::as_link)
                    .map(|link| encode_link(link, None))
                    .collect();
                links.insert(key.clone(), Value::Array(items));
            }
            Node::Object(obj) if !obj.is_empty() && obj.iter().all(|(_, n)| is_link(n)) => {
                let items: Vec<Value> = obj
                    .iter()
                    .filter_map(|(name, node)| {
                        node.as_link().map(|link| encode_link(link, Some(name)))
                    })
                    .collect();
                links.insert(key.clone(), Value::Array(items));
            }
            Node::Document(nested) => {
                embedded.insert(key.clone(), encode_document(nested));
            }
            Node::Array(arr) if !arr.is_empty() && arr.iter().all(is_document) => {
                let items: Vec<Value> = arr
                    .iter()
                    .filter_map(Node::as_document)
                    .map(encode_document)
                    .collect();
                embedded.insert(key.clone(), Value::Array(items));
            }
            other => {
                data.insert(key.clone(), node_to_plain(other));
            }
        }
    }

    let mut out = Map::new();
    out.insert("_links".to_string(), Value::Object(links));
    for (key, value) in data {
        out.insert(key, value);
    }
    if !embedded.is_empty() {
        out.insert("_embedded".to_string(), Value::Object(embedded));
    }
    Value::Object(out)
}

fn is_link(node: &Node) -> bool {
    matches!(node, Node::Link(_))
}

fn is_document(node: &Node) -> bool {
    matches!(node, Node::Document(_))
}

fn encode_link(link: &Link, name: Option<&str>) -> Value {
    let mut map = Map::new();
    map.insert("href".to_string(), json!(link.url()));
    if let Some(name) = name {
        map.insert("name".to_string(), json!(name));
    }
    let templated = link
        .fields()
        .iter()
        .any(|field| field.location == Some(FieldLocation::Path));
    if templated {
        map.insert("templated".to_string(), json!(true));
    }
    Value::Object(map)
}

/// Generic JSON rendering for nodes landing in plain state.
fn node_to_plain(node: &Node) -> Value {
    match node {
        Node::Document(doc) => {
            let mut map = Map::new();
            for (key, child) in doc.iter() {
                map.insert(key.clone(), node_to_plain(child));
            }
            Value::Object(map)
        }
        Node::Object(obj) => {
            let mut map = Map::new();
            for (key, child) in obj.iter() {
                map.insert(key.clone(), node_to_plain(child));
            }
            Value::Object(map)
        }
        Node::Error(err) => {
            let mut map = Map::new();
            for (key, child) in err.iter() {
                map.insert(key.clone(), node_to_plain(child));
            }
            Value::Object(map)
        }
        Node::Array(arr) => Value::Array(arr.iter().map(node_to_plain).collect()),
        Node::Link(link) => json!({"href": link.url()}),
        Node::String(s) => json!(s),
        Node::Integer(i) => json!(i),
        Node::Float(f) => json!(f),
        Node::Bool(b) => json!(b),
        Node::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_mapping() {
        assert_eq!(transform_rel("http://example.com/rels/next"), "next");
        assert_eq!(transform_rel("ex:widgets"), "widgets");
        assert_eq!(transform_rel("next"), "next");
        assert_eq!(transform_rel("http://example.com/rels/next/"), "next");
    }

    #[test]
    fn decode_self_and_data() {
        let codec = HalCodec::new();
        let payload = br#"{
            "_links": {"self": {"href": "/orders/1", "title": "Order 1"}},
            "total": 30,
            "status": "shipped"
        }"#;
        let decoded = codec.decode(payload, Some("http://shop.example.com/")).unwrap();
        let doc = decoded.as_document().unwrap().clone();
        assert_eq!(doc.url(), "http://shop.example.com/orders/1");
        assert_eq!(doc.title(), "Order 1");
        assert_eq!(doc.get("total").unwrap(), &Node::Integer(30));
    }

    #[test]
    fn decode_templated_link_grows_path_fields() {
        let codec = HalCodec::new();
        let payload = br#"{
            "_links": {
                "self": {"href": "http://api.example.com/"},
                "find": {"href": "/orders/{id}", "templated": true}
            }
        }"#;
        let decoded = codec.decode(payload, None).unwrap();
        let doc = decoded.as_document().unwrap().clone();
        let link = doc.get("find").unwrap().as_link().unwrap();
        assert_eq!(link.url(), "http://api.example.com/orders/{id}");
        assert_eq!(link.fields().len(), 1);
        assert_eq!(link.fields()[0].name, "id");
        assert_eq!(link.fields()[0].location, Some(FieldLocation::Path));
        assert!(link.fields()[0].required);
    }

    #[test]
    fn decode_named_link_list_becomes_mapping() {
        let codec = HalCodec::new();
        let payload = br#"{
            "_links": {
                "self": {"href": "http://api.example.com/"},
                "ea:admin": [
                    {"href": "/admins/2", "name": "fred"},
                    {"href": "/admins/5", "name": "kate"}
                ]
            }
        }"#;
        let decoded = codec.decode(payload, None).unwrap();
        let doc = decoded.as_document().unwrap().clone();
        let admins = doc.get("admin").unwrap().as_object().unwrap();
        let fred = admins.get("fred").unwrap().as_link().unwrap();
        assert_eq!(fred.url(), "http://api.example.com/admins/2");
        assert!(admins.get("kate").is_some());
    }

    #[test]
    fn decode_embedded_inherits_base() {
        let codec = HalCodec::new();
        let payload = br#"{
            "_links": {"self": {"href": "http://api.example.com/orders"}},
            "_embedded": {
                "ea:order": [
                    {
                        "_links": {"self": {"href": "/orders/123"}},
                        "total": 30
                    }
                ]
            }
        }"#;
        let decoded = codec.decode(payload, None).unwrap();
        let doc = decoded.as_document().unwrap().clone();
        let orders = doc.get("order").unwrap().as_array().unwrap();
        let first = orders.get(0).unwrap().as_document().unwrap();
        assert_eq!(first.url(), "http://api.example.com/orders/123");
        assert_eq!(first.get("total").unwrap(), &Node::Integer(30));
    }

    #[test]
    fn encode_shape() {
        let codec = HalCodec::new();
        let mut content = IndexMap::new();
        content.insert(
            "next".to_string(),
            Node::Link(
                Link::new("http://api.example.com/orders/{id}").with_fields(vec![Field::new(
                    "id",
                )
                .required(true)
                .location(FieldLocation::Path)]),
            ),
        );
        content.insert("total".to_string(), Node::Integer(30));
        let doc = Document::new("http://api.example.com/orders", "Orders", content);
        let bytes = codec
            .encode(&Node::Document(doc), &EncodeOptions::default())
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value["_links"]["self"],
            json!({"href": "http://api.example.com/orders", "title": "Orders"})
        );
        assert_eq!(
            value["_links"]["next"],
            json!({"href": "http://api.example.com/orders/{id}", "templated": true})
        );
        assert_eq!(value["total"], json!(30));
    }

    #[test]
    fn encode_rejects_error_root() {
        let codec = HalCodec::new();
        let err = codec
            .encode(
                &Node::Error(
                    hyperdoc_document::ErrorNode::new("nope", IndexMap::new()).unwrap(),
                ),
                &EncodeOptions::default(),
            )
            .err()
            .unwrap();
        assert!(matches!(err, CodecError::UnsupportedRoot { kind: "error" }));
    }
}
