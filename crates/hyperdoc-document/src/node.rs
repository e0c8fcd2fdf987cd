//! Canonical node kinds.
//!
//! All containers are persistent values: the payload lives behind an [`Arc`],
//! `Clone` is O(1), and edits (see [`crate::update`]) build new containers
//! while untouched children keep their original allocations. Key uniqueness
//! and insertion order come from [`IndexMap`]; non-string keys and
//! unrecognized child kinds are unrepresentable by construction.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use hyperdoc_schema::Schema;

use crate::error::DocumentError;

/// A value in the canonical document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Document),
    Object(Object),
    Array(Array),
    Link(Link),
    Error(ErrorNode),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Node {
    /// Lowercase kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Document(_) => "document",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
            Node::Link(_) => "link",
            Node::Error(_) => "error",
            Node::String(_) => "string",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::Bool(_) => "bool",
            Node::Null => "null",
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Node::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Node::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for the two tree containers sharing the mapping shape plus arrays.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Document(_) | Node::Object(_) | Node::Array(_))
    }

    /// Allocation identity: true when both nodes are containers of the same
    /// kind sharing one payload. Leaves are compared by value.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Document(a), Node::Document(b)) => a.ptr_eq(b),
            (Node::Object(a), Node::Object(b)) => a.ptr_eq(b),
            (Node::Array(a), Node::Array(b)) => a.ptr_eq(b),
            (Node::Link(a), Node::Link(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            (Node::Error(a), Node::Error(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            (a, b) => a == b,
        }
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// An addressable resource: an ordered name→node mapping with a `url` and a
/// `title`.
#[derive(Debug, Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

#[derive(Debug)]
struct DocumentInner {
    url: String,
    title: String,
    content: IndexMap<String, Node>,
}

impl Document {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: IndexMap<String, Node>,
    ) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                url: url.into(),
                title: title.into(),
                content,
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn content(&self) -> &IndexMap<String, Node> {
        &self.inner.content
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.inner.content.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.content.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.inner.content.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.content.keys()
    }

    /// New document with the same url/title and different content.
    pub fn with_content(&self, content: IndexMap<String, Node>) -> Self {
        Self::new(self.url(), self.title(), content)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.url() == other.url()
            && self.title() == other.title()
            && self.content() == other.content()
    }
}

impl Index<&str> for Document {
    type Output = Node;

    fn index(&self, key: &str) -> &Node {
        self.get(key)
            .unwrap_or_else(|| panic!("no key {key:?} in document"))
    }
}

// ── Object ────────────────────────────────────────────────────────────────

/// A plain nested mapping: same shape as [`Document`] without url/title.
#[derive(Debug, Clone)]
pub struct Object {
    inner: Arc<IndexMap<String, Node>>,
}

impl Object {
    pub fn new(content: IndexMap<String, Node>) -> Self {
        Self {
            inner: Arc::new(content),
        }
    }

    pub fn content(&self) -> &IndexMap<String, Node> {
        &self.inner
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.inner.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new(IndexMap::new())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.content() == other.content()
    }
}

impl Index<&str> for Object {
    type Output = Node;

    fn index(&self, key: &str) -> &Node {
        self.get(key)
            .unwrap_or_else(|| panic!("no key {key:?} in object"))
    }
}

// ── Array ─────────────────────────────────────────────────────────────────

/// An ordered sequence of nodes.
#[derive(Debug, Clone)]
pub struct Array {
    inner: Arc<Vec<Node>>,
}

impl Array {
    pub fn new(items: Vec<Node>) -> Self {
        Self {
            inner: Arc::new(items),
        }
    }

    pub fn items(&self) -> &[Node] {
        &self.inner
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.inner.get(index)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.inner.iter()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.items() == other.items()
    }
}

impl Index<usize> for Array {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.inner[index]
    }
}

impl FromIterator<Node> for Array {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Link ──────────────────────────────────────────────────────────────────

/// Whether invoking a link replaces a subtree of the originating tree or
/// returns a fresh detached tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Inline,
    New,
}

impl Transform {
    pub fn as_str(self) -> &'static str {
        match self {
            Transform::Inline => "inline",
            Transform::New => "new",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inline" => Some(Transform::Inline),
            "new" => Some(Transform::New),
            _ => None,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An available transition to another resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub(crate) inner: Arc<LinkInner>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkInner {
    url: String,
    action: String,
    encoding: String,
    transform: Option<Transform>,
    fields: Vec<Field>,
    description: String,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                url: url.into(),
                action: "get".to_string(),
                encoding: String::new(),
                transform: None,
                fields: Vec::new(),
                description: String::new(),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn action(&self) -> &str {
        &self.inner.action
    }

    pub fn encoding(&self) -> &str {
        &self.inner.encoding
    }

    pub fn transform(&self) -> Option<Transform> {
        self.inner.transform
    }

    pub fn fields(&self) -> &[Field] {
        &self.inner.fields
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).action = action.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).encoding = encoding.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        Arc::make_mut(&mut self.inner).transform = Some(transform);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        Arc::make_mut(&mut self.inner).fields = fields;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).description = description.into();
        self
    }
}

// ── Field ─────────────────────────────────────────────────────────────────

/// Where a field's value is placed when a link is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    Path,
    Query,
    Form,
    Body,
}

impl FieldLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLocation::Path => "path",
            FieldLocation::Query => "query",
            FieldLocation::Form => "form",
            FieldLocation::Body => "body",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(FieldLocation::Path),
            "query" => Some(FieldLocation::Query),
            "form" | "formData" => Some(FieldLocation::Form),
            "body" => Some(FieldLocation::Body),
            _ => None,
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named parameter of a [`Link`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub required: bool,
    /// `None` means: infer from the link's action verb.
    pub location: Option<FieldLocation>,
    pub description: String,
    pub schema: Option<Schema>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            location: None,
            description: String::new(),
            schema: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn location(mut self, location: FieldLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Resolve an unset location from the HTTP verb: reads put parameters in
    /// the query string, writes in the form body.
    pub fn location_for_action(&self, action: &str) -> FieldLocation {
        if let Some(location) = self.location {
            return location;
        }
        match action.to_lowercase().as_str() {
            "get" | "delete" | "head" | "options" => FieldLocation::Query,
            _ => FieldLocation::Form,
        }
    }
}

// ── Error ─────────────────────────────────────────────────────────────────

/// A decoded error payload: pure data with a title.
///
/// Construction walks the content eagerly and rejects `Link` or `Document`
/// values at any depth.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub(crate) inner: Arc<ErrorInner>,
}

#[derive(Debug)]
pub(crate) struct ErrorInner {
    title: String,
    content: IndexMap<String, Node>,
}

impl ErrorNode {
    pub fn new(
        title: impl Into<String>,
        content: IndexMap<String, Node>,
    ) -> Result<Self, DocumentError> {
        for node in content.values() {
            check_error_child(node)?;
        }
        Ok(Self {
            inner: Arc::new(ErrorInner {
                title: title.into(),
                content,
            }),
        })
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn content(&self) -> &IndexMap<String, Node> {
        &self.inner.content
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.inner.content.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.content.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.inner.content.iter()
    }

    /// Flatten all leaf messages in the content, a convenience for callers
    /// that surface errors as text.
    pub fn messages(&self) -> Vec<String> {
        fn walk(node: &Node, out: &mut Vec<String>) {
            match node {
                Node::String(s) => out.push(s.clone()),
                Node::Array(arr) => arr.iter().for_each(|n| walk(n, out)),
                Node::Object(obj) => obj.iter().for_each(|(_, n)| walk(n, out)),
                _ => {}
            }
        }
        let mut out = Vec::new();
        for (_, node) in self.iter() {
            walk(node, &mut out);
        }
        out
    }
}

impl PartialEq for ErrorNode {
    fn eq(&self, other: &Self) -> bool {
        self.title() == other.title() && self.content() == other.content()
    }
}

fn check_error_child(node: &Node) -> Result<(), DocumentError> {
    match node {
        Node::Link(_) => Err(DocumentError::LinkInsideError),
        Node::Document(_) => Err(DocumentError::DocumentInsideError),
        Node::Object(obj) => {
            for child in obj.content().values() {
                check_error_child(child)?;
            }
            Ok(())
        }
        Node::Array(arr) => {
            for child in arr.iter() {
                check_error_child(child)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<Document> for Node {
    fn from(value: Document) -> Self {
        Node::Document(value)
    }
}

impl From<Object> for Node {
    fn from(value: Object) -> Self {
        Node::Object(value)
    }
}

impl From<Array> for Node {
    fn from(value: Array) -> Self {
        Node::Array(value)
    }
}

impl From<Link> for Node {
    fn from(value: Link) -> Self {
        Node::Link(value)
    }
}

impl From<ErrorNode> for Node {
    fn from(value: ErrorNode) -> Self {
        Node::Error(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Integer(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

// ── Structural equality with plain JSON ───────────────────────────────────

impl PartialEq<Value> for Node {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Node::Document(doc), Value::Object(map)) => mapping_eq(doc.content(), map),
            (Node::Object(obj), Value::Object(map)) => mapping_eq(obj.content(), map),
            (Node::Array(arr), Value::Array(items)) => {
                arr.len() == items.len() && arr.iter().zip(items).all(|(a, b)| a == b)
            }
            (Node::String(s), Value::String(other)) => s == other,
            (Node::Integer(i), Value::Number(n)) => {
                n.as_i64() == Some(*i) || n.as_f64() == Some(*i as f64)
            }
            (Node::Float(f), Value::Number(n)) => n.as_f64() == Some(*f),
            (Node::Bool(b), Value::Bool(other)) => b == other,
            (Node::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl PartialEq<Node> for Value {
    fn eq(&self, other: &Node) -> bool {
        other == self
    }
}

impl PartialEq<Value> for Document {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(map) if mapping_eq(self.content(), map))
    }
}

impl PartialEq<Value> for Object {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(map) if mapping_eq(self.content(), map))
    }
}

impl PartialEq<Value> for Array {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Array(items)
            if self.len() == items.len() && self.iter().zip(items).all(|(a, b)| a == b))
    }
}

fn mapping_eq(content: &IndexMap<String, Node>, map: &serde_json::Map<String, Value>) -> bool {
    content.len() == map.len()
        && content
            .iter()
            .all(|(key, node)| map.get(key).is_some_and(|value| node == value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use serde_json::json;

    #[test]
    fn document_preserves_insertion_order() {
        let doc = Document::new(
            "http://example.com/",
            "Example",
            indexmap! {
                "b".to_string() => Node::from(1),
                "a".to_string() => Node::from(2),
            },
        );
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn clone_shares_content() {
        let doc = Document::new("", "", indexmap! {"a".to_string() => Node::from(1)});
        let copy = doc.clone();
        assert!(doc.ptr_eq(&copy));
    }

    #[test]
    fn error_rejects_link_children() {
        let content = indexmap! {
            "next".to_string() => Node::Link(Link::new("http://example.com/")),
        };
        assert_eq!(
            ErrorNode::new("Bad request", content).unwrap_err(),
            DocumentError::LinkInsideError,
        );
    }

    #[test]
    fn error_rejects_nested_document_deeply() {
        let nested = Node::Array(Array::new(vec![Node::Document(Document::new(
            "",
            "",
            IndexMap::new(),
        ))]));
        let content = indexmap! {"messages".to_string() => nested};
        assert_eq!(
            ErrorNode::new("Bad request", content).unwrap_err(),
            DocumentError::DocumentInsideError,
        );
    }

    #[test]
    fn error_accepts_plain_data() {
        let content = indexmap! {
            "messages".to_string() => Node::Array(Array::new(vec![Node::from("nope")])),
        };
        let err = ErrorNode::new("Bad request", content).unwrap();
        assert_eq!(err.messages(), ["nope"]);
    }

    #[test]
    fn equality_with_plain_json() {
        let obj = Object::new(indexmap! {
            "a".to_string() => Node::from(1),
            "b".to_string() => Node::Array(Array::new(vec![Node::from(true), Node::Null])),
        });
        assert_eq!(Node::Object(obj), json!({"a": 1, "b": [true, null]}));
        assert_ne!(
            Node::Link(Link::new("http://example.com/")),
            json!({"url": "http://example.com/"})
        );
    }

    #[test]
    fn field_location_inference() {
        let field = Field::new("page");
        assert_eq!(field.location_for_action("get"), FieldLocation::Query);
        assert_eq!(field.location_for_action("delete"), FieldLocation::Query);
        assert_eq!(field.location_for_action("post"), FieldLocation::Form);
        let pinned = Field::new("id").location(FieldLocation::Path);
        assert_eq!(pinned.location_for_action("post"), FieldLocation::Path);
    }

    #[test]
    fn link_builder_style() {
        let link = Link::new("/pets")
            .with_action("post")
            .with_transform(Transform::New)
            .with_fields(vec![Field::new("name").required(true)]);
        assert_eq!(link.action(), "post");
        assert_eq!(link.transform(), Some(Transform::New));
        assert_eq!(link.fields().len(), 1);
    }
}
