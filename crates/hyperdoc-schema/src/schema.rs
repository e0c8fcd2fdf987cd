//! Schema descriptor value types.
//!
//! Every kind is a plain immutable struct of constraint fields with chainable
//! setters. There is no type hierarchy and no runtime-synthesized subtypes: a
//! "string with these constraints" is just a [`StringSchema`] value.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

/// Fields common to all schema kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaBase {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Accept JSON `null` in addition to the kind's own values.
    pub allow_null: bool,
}

/// A schema descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Integer(IntegerSchema),
    Boolean(BooleanSchema),
    Enum(EnumSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Union(UnionSchema),
    Any(AnySchema),
}

impl Schema {
    pub fn base(&self) -> &SchemaBase {
        match self {
            Schema::String(s) => &s.base,
            Schema::Number(s) => &s.base,
            Schema::Integer(s) => &s.base,
            Schema::Boolean(s) => &s.base,
            Schema::Enum(s) => &s.base,
            Schema::Object(s) => &s.base,
            Schema::Array(s) => &s.base,
            Schema::Union(s) => &s.base,
            Schema::Any(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SchemaBase {
        match self {
            Schema::String(s) => &mut s.base,
            Schema::Number(s) => &mut s.base,
            Schema::Integer(s) => &mut s.base,
            Schema::Boolean(s) => &mut s.base,
            Schema::Enum(s) => &mut s.base,
            Schema::Object(s) => &mut s.base,
            Schema::Array(s) => &mut s.base,
            Schema::Union(s) => &mut s.base,
            Schema::Any(s) => &mut s.base,
        }
    }

    /// Consume and return the schema with `allow_null` set.
    pub fn with_allow_null(mut self) -> Self {
        self.base_mut().allow_null = true;
        self
    }
}

/// Boolean allow/deny, or a schema applied to whatever remains.
///
/// Used for `additional_properties` on objects and `additional_items` on
/// arrays with positional item lists.
#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    Allowed(bool),
    Schema(Box<Schema>),
}

// ── String ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StringSchema {
    pub base: SchemaBase,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Checked with a regex *search*, not a full match.
    pub pattern: Option<Regex>,
    /// Informational format tag (`"email"`, `"uri"`, ...). Never enforced.
    pub format: Option<String>,
    /// Trim surrounding whitespace before length/pattern checks.
    pub trim_whitespace: bool,
}

impl Default for StringSchema {
    fn default() -> Self {
        Self {
            base: SchemaBase::default(),
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            trim_whitespace: true,
        }
    }
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }
}

impl PartialEq for StringSchema {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.format == other.format
            && self.trim_whitespace == other.trim_whitespace
            && pattern_text(&self.pattern) == pattern_text(&other.pattern)
    }
}

fn pattern_text(pattern: &Option<Regex>) -> Option<&str> {
    pattern.as_ref().map(|re| re.as_str())
}

// ── Number / Integer ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub base: SchemaBase,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<f64>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, bound: f64) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn maximum(mut self, bound: f64) -> Self {
        self.maximum = Some(bound);
        self
    }

    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.exclusive_minimum = exclusive;
        self
    }

    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.exclusive_maximum = exclusive;
        self
    }

    pub fn multiple_of(mut self, step: f64) -> Self {
        self.multiple_of = Some(step);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerSchema {
    pub base: SchemaBase,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<i64>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minimum(mut self, bound: f64) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn maximum(mut self, bound: f64) -> Self {
        self.maximum = Some(bound);
        self
    }

    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.exclusive_minimum = exclusive;
        self
    }

    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.exclusive_maximum = exclusive;
        self
    }

    pub fn multiple_of(mut self, step: i64) -> Self {
        self.multiple_of = Some(step);
        self
    }
}

// ── Boolean ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    pub base: SchemaBase,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── Enum ──────────────────────────────────────────────────────────────────

/// A fixed ordered set of allowed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumSchema {
    pub base: SchemaBase,
    pub choices: Vec<Value>,
}

impl EnumSchema {
    pub fn new(choices: impl IntoIterator<Item = Value>) -> Self {
        Self {
            base: SchemaBase::default(),
            choices: choices.into_iter().collect(),
        }
    }
}

// ── Object ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub base: SchemaBase,
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    /// Applied, first match wins, to keys not consumed by named properties.
    pub pattern_properties: Vec<(Regex, Schema)>,
    /// `None` silently drops keys matched by neither properties nor
    /// pattern_properties.
    pub additional_properties: Option<Additional>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn pattern_property(mut self, pattern: Regex, schema: Schema) -> Self {
        self.pattern_properties.push((pattern, schema));
        self
    }

    pub fn additional_properties(mut self, additional: Additional) -> Self {
        self.additional_properties = Some(additional);
        self
    }
}

impl PartialEq for ObjectSchema {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.properties == other.properties
            && self.required == other.required
            && self.additional_properties == other.additional_properties
            && self.pattern_properties.len() == other.pattern_properties.len()
            && self
                .pattern_properties
                .iter()
                .zip(&other.pattern_properties)
                .all(|((ra, sa), (rb, sb))| ra.as_str() == rb.as_str() && sa == sb)
    }
}

// ── Array ─────────────────────────────────────────────────────────────────

/// Item typing: one schema for every element, or an ordered positional list.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    Single(Box<Schema>),
    Tuple(Vec<Schema>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub base: SchemaBase,
    pub items: Option<Items>,
    /// Governs elements beyond a positional [`Items::Tuple`] list.
    pub additional_items: Option<Additional>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

impl ArraySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, schema: Schema) -> Self {
        self.items = Some(Items::Single(Box::new(schema)));
        self
    }

    pub fn tuple_items(mut self, schemas: impl IntoIterator<Item = Schema>) -> Self {
        self.items = Some(Items::Tuple(schemas.into_iter().collect()));
        self
    }

    pub fn additional_items(mut self, additional: Additional) -> Self {
        self.additional_items = Some(additional);
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = unique;
        self
    }
}

// ── Union / Any ───────────────────────────────────────────────────────────

/// A tagged union: the value must satisfy one of the member schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionSchema {
    pub base: SchemaBase,
    pub members: Vec<Schema>,
}

impl UnionSchema {
    pub fn new(members: impl IntoIterator<Item = Schema>) -> Self {
        Self {
            base: SchemaBase::default(),
            members: members.into_iter().collect(),
        }
    }
}

/// Identity passthrough.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnySchema {
    pub base: SchemaBase,
}

impl AnySchema {
    pub fn new() -> Self {
        Self::default()
    }
}
