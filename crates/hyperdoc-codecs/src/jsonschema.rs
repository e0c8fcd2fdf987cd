//! Bridge between JSON-Schema structs and the validation engine.
//!
//! This is the one codec whose payload is a [`Schema`] rather than a
//! document, so it is not registered for negotiation; the other codecs call
//! it directly for field schemas.

use regex::Regex;
use serde_json::{json, Map, Value};

use hyperdoc_schema::{
    Additional, AnySchema, ArraySchema, BooleanSchema, EnumSchema, IntegerSchema, Items,
    NumberSchema, ObjectSchema, Schema, StringSchema, UnionSchema,
};

use crate::codec::CodecError;

const PRIMITIVE_TYPES: [&str; 6] = ["string", "number", "integer", "boolean", "object", "array"];

const CONSTRAINT_KEYWORDS: [&str; 15] = [
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "enum",
    "properties",
    "required",
    "patternProperties",
    "additionalProperties",
    "items",
];

/// Decode a JSON-Schema struct into one validation-engine schema node.
pub fn decode_schema(value: &Value) -> Result<Schema, CodecError> {
    let Some(map) = value.as_object() else {
        return Err(CodecError::Parse(
            "schema must be a JSON object".to_string(),
        ));
    };

    let mut types = declared_types(map);
    let allow_null = types.iter().any(|t| t == "null");
    types.retain(|t| t != "null");

    if map.contains_key("enum") {
        let mut schema = decode_enum(map)?;
        if allow_null {
            schema = schema.with_allow_null();
        }
        return Ok(schema);
    }

    // "integer" together with "number" collapses to integer only.
    if types.iter().any(|t| t == "integer") && types.iter().any(|t| t == "number") {
        types.retain(|t| t != "number");
    }

    let schema = match types.as_slice() {
        [] => decode_untyped(map)?,
        [single] => decode_typed(single, map)?,
        many => {
            let members = many
                .iter()
                .map(|t| decode_typed(t, map))
                .collect::<Result<Vec<_>, _>>()?;
            Schema::Union(UnionSchema::new(members))
        }
    };

    let mut schema = apply_base(schema, map);
    if allow_null {
        schema = schema.with_allow_null();
    }
    Ok(schema)
}

fn declared_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_enum(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let choices = map
        .get("enum")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(apply_base(Schema::Enum(EnumSchema::new(choices)), map))
}

/// No `type` keyword: infer the kind from the constraint keywords present,
/// or fall back to Any when the struct is unconstrained.
fn decode_untyped(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    if !CONSTRAINT_KEYWORDS.iter().any(|kw| map.contains_key(*kw)) {
        return Ok(Schema::Any(AnySchema::new()));
    }
    if ["properties", "required", "patternProperties", "additionalProperties"]
        .iter()
        .any(|kw| map.contains_key(*kw))
    {
        return decode_typed("object", map);
    }
    if map.contains_key("items") {
        return decode_typed("array", map);
    }
    if ["minLength", "maxLength", "pattern", "format"]
        .iter()
        .any(|kw| map.contains_key(*kw))
    {
        return decode_typed("string", map);
    }
    decode_typed("number", map)
}

fn decode_typed(type_name: &str, map: &Map<String, Value>) -> Result<Schema, CodecError> {
    match type_name {
        "string" => decode_string(map),
        "number" => decode_number(map),
        "integer" => decode_integer(map),
        "boolean" => Ok(Schema::Boolean(BooleanSchema::new())),
        "object" => decode_object(map),
        "array" => decode_array(map),
        other => Err(CodecError::Parse(format!(
            "unrecognized schema type {other:?}"
        ))),
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, CodecError> {
    Regex::new(pattern)
        .map_err(|err| CodecError::Parse(format!("invalid pattern {pattern:?}: {err}")))
}

fn decode_string(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let mut schema = StringSchema::new();
    if let Some(min) = map.get("minLength").and_then(Value::as_u64) {
        schema = schema.min_length(min as usize);
    }
    if let Some(max) = map.get("maxLength").and_then(Value::as_u64) {
        schema = schema.max_length(max as usize);
    }
    if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
        schema = schema.pattern(compile_pattern(pattern)?);
    }
    if let Some(format) = map.get("format").and_then(Value::as_str) {
        schema = schema.format(format);
    }
    Ok(Schema::String(schema))
}

/// Draft-4 boolean `exclusiveMinimum`/`exclusiveMaximum` and the later
/// numeric form are both accepted.
fn bounds(map: &Map<String, Value>) -> (Option<f64>, Option<f64>, bool, bool) {
    let mut minimum = map.get("minimum").and_then(Value::as_f64);
    let mut maximum = map.get("maximum").and_then(Value::as_f64);
    let mut exclusive_min = false;
    let mut exclusive_max = false;
    match map.get("exclusiveMinimum") {
        Some(Value::Bool(flag)) => exclusive_min = *flag,
        Some(Value::Number(n)) => {
            minimum = n.as_f64();
            exclusive_min = true;
        }
        _ => {}
    }
    match map.get("exclusiveMaximum") {
        Some(Value::Bool(flag)) => exclusive_max = *flag,
        Some(Value::Number(n)) => {
            maximum = n.as_f64();
            exclusive_max = true;
        }
        _ => {}
    }
    (minimum, maximum, exclusive_min, exclusive_max)
}

fn decode_number(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let (minimum, maximum, exclusive_min, exclusive_max) = bounds(map);
    let mut schema = NumberSchema::new()
        .exclusive_minimum(exclusive_min)
        .exclusive_maximum(exclusive_max);
    if let Some(min) = minimum {
        schema = schema.minimum(min);
    }
    if let Some(max) = maximum {
        schema = schema.maximum(max);
    }
    if let Some(step) = map.get("multipleOf").and_then(Value::as_f64) {
        schema = schema.multiple_of(step);
    }
    Ok(Schema::Number(schema))
}

fn decode_integer(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let (minimum, maximum, exclusive_min, exclusive_max) = bounds(map);
    let mut schema = IntegerSchema::new()
        .exclusive_minimum(exclusive_min)
        .exclusive_maximum(exclusive_max);
    if let Some(min) = minimum {
        schema = schema.minimum(min);
    }
    if let Some(max) = maximum {
        schema = schema.maximum(max);
    }
    if let Some(step) = map.get("multipleOf").and_then(Value::as_i64) {
        schema = schema.multiple_of(step);
    }
    Ok(Schema::Integer(schema))
}

fn decode_object(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let mut schema = ObjectSchema::new();
    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        for (name, child) in properties {
            schema = schema.property(name, decode_schema(child)?);
        }
    }
    if let Some(required) = map.get("required").and_then(Value::as_array) {
        schema = schema.required(
            required
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>(),
        );
    }
    if let Some(patterns) = map.get("patternProperties").and_then(Value::as_object) {
        for (pattern, child) in patterns {
            schema = schema.pattern_property(compile_pattern(pattern)?, decode_schema(child)?);
        }
    }
    match map.get("additionalProperties") {
        Some(Value::Bool(allowed)) => {
            schema = schema.additional_properties(Additional::Allowed(*allowed));
        }
        Some(other @ Value::Object(_)) => {
            schema = schema
                .additional_properties(Additional::Schema(Box::new(decode_schema(other)?)));
        }
        _ => {}
    }
    Ok(Schema::Object(schema))
}

fn decode_array(map: &Map<String, Value>) -> Result<Schema, CodecError> {
    let mut schema = ArraySchema::new();
    match map.get("items") {
        Some(single @ Value::Object(_)) => {
            schema = schema.items(decode_schema(single)?);
        }
        Some(Value::Array(positional)) => {
            schema = schema.tuple_items(
                positional
                    .iter()
                    .map(decode_schema)
                    .collect::<Result<Vec<_>, _>>()?,
            );
        }
        _ => {}
    }
    match map.get("additionalItems") {
        Some(Value::Bool(allowed)) => {
            schema = schema.additional_items(Additional::Allowed(*allowed));
        }
        Some(other @ Value::Object(_)) => {
            schema = schema.additional_items(Additional::Schema(Box::new(decode_schema(other)?)));
        }
        _ => {}
    }
    if let Some(min) = map.get("minItems").and_then(Value::as_u64) {
        schema = schema.min_items(min as usize);
    }
    if let Some(max) = map.get("maxItems").and_then(Value::as_u64) {
        schema = schema.max_items(max as usize);
    }
    if let Some(unique) = map.get("uniqueItems").and_then(Value::as_bool) {
        schema = schema.unique_items(unique);
    }
    Ok(Schema::Array(schema))
}

fn apply_base(mut schema: Schema, map: &Map<String, Value>) -> Schema {
    if let Some(title) = map.get("title").and_then(Value::as_str) {
        schema.base_mut().title = Some(title.to_string());
    }
    if let Some(description) = map.get("description").and_then(Value::as_str) {
        schema.base_mut().description = Some(description.to_string());
    }
    schema
}

/// Encode a schema back into a JSON-Schema struct, the inverse of
/// [`decode_schema`].
pub fn encode_schema(schema: &Schema) -> Value {
    let mut map = Map::new();
    match schema {
        Schema::String(s) => {
            insert_type(&mut map, "string", s.base.allow_null);
            if let Some(min) = s.min_length {
                map.insert("minLength".to_string(), json!(min));
            }
            if let Some(max) = s.max_length {
                map.insert("maxLength".to_string(), json!(max));
            }
            if let Some(pattern) = &s.pattern {
                map.insert("pattern".to_string(), json!(pattern.as_str()));
            }
            if let Some(format) = &s.format {
                map.insert("format".to_string(), json!(format));
            }
        }
        Schema::Number(s) => {
            insert_type(&mut map, "number", s.base.allow_null);
            encode_bounds(
                &mut map,
                s.minimum,
                s.maximum,
                s.exclusive_minimum,
                s.exclusive_maximum,
            );
            if let Some(step) = s.multiple_of {
                map.insert("multipleOf".to_string(), json!(step));
            }
        }
        Schema::Integer(s) => {
            insert_type(&mut map, "integer", s.base.allow_null);
            encode_bounds(
                &mut map,
                s.minimum,
                s.maximum,
                s.exclusive_minimum,
                s.exclusive_maximum,
            );
            if let Some(step) = s.multiple_of {
                map.insert("multipleOf".to_string(), json!(step));
            }
        }
        Schema::Boolean(s) => {
            insert_type(&mut map, "boolean", s.base.allow_null);
        }
        Schema::Enum(s) => {
            map.insert("enum".to_string(), Value::Array(s.choices.clone()));
            if s.base.allow_null {
                map.insert("type".to_string(), json!(["null"]));
            }
        }
        Schema::Object(s) => {
            insert_type(&mut map, "object", s.base.allow_null);
            if !s.properties.is_empty() {
                let mut properties = Map::new();
                for (name, child) in &s.properties {
                    properties.insert(name.clone(), encode_schema(child));
                }
                map.insert("properties".to_string(), Value::Object(properties));
            }
            if !s.required.is_empty() {
                map.insert("required".to_string(), json!(s.required));
            }
            if !s.pattern_properties.is_empty() {
                let mut patterns = Map::new();
                for (pattern, child) in &s.pattern_properties {
                    patterns.insert(pattern.as_str().to_string(), encode_schema(child));
                }
                map.insert("patternProperties".to_string(), Value::Object(patterns));
            }
            match &s.additional_properties {
                Some(Additional::Allowed(allowed)) => {
                    map.insert("additionalProperties".to_string(), json!(allowed));
                }
                Some(Additional::Schema(child)) => {
                    map.insert("additionalProperties".to_string(), encode_schema(child));
                }
                None => {}
            }
        }
        Schema::Array(s) => {
            insert_type(&mut map, "array", s.base.allow_null);
            match &s.items {
                Some(Items::Single(child)) => {
                    map.insert("items".to_string(), encode_schema(child));
                }
                Some(Items::Tuple(positional)) => {
                    map.insert(
                        "items".to_string(),
                        Value::Array(positional.iter().map(encode_schema).collect()),
                    );
                }
                None => {}
            }
            match &s.additional_items {
                Some(Additional::Allowed(allowed)) => {
                    map.insert("additionalItems".to_string(), json!(allowed));
                }
                Some(Additional::Schema(child)) => {
                    map.insert("additionalItems".to_string(), encode_schema(child));
                }
                None => {}
            }
            if let Some(min) = s.min_items {
                map.insert("minItems".to_string(), json!(min));
            }
            if let Some(max) = s.max_items {
                map.insert("maxItems".to_string(), json!(max));
            }
            if s.unique_items {
                map.insert("uniqueItems".to_string(), json!(true));
            }
        }
        Schema::Union(s) => {
            let mut types: Vec<Value> = Vec::new();
            for member in &s.members {
                if let Some(name) = type_name(member) {
                    types.push(json!(name));
                }
            }
            if s.base.allow_null {
                types.push(json!("null"));
            }
            map.insert("type".to_string(), Value::Array(types));
        }
        Schema::Any(_) => {}
    }
    if let Some(title) = &schema.base().title {
        map.insert("title".to_string(), json!(title));
    }
    if let Some(description) = &schema.base().description {
        map.insert("description".to_string(), json!(description));
    }
    Value::Object(map)
}

fn insert_type(map: &mut Map<String, Value>, name: &str, allow_null: bool) {
    if allow_null {
        map.insert("type".to_string(), json!([name, "null"]));
    } else {
        map.insert("type".to_string(), json!(name));
    }
}

fn encode_bounds(
    map: &mut Map<String, Value>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_min: bool,
    exclusive_max: bool,
) {
    if let Some(min) = minimum {
        map.insert("minimum".to_string(), json!(min));
        if exclusive_min {
            map.insert("exclusiveMinimum".to_string(), json!(true));
        }
    }
    if let Some(max) = maximum {
        map.insert("maximum".to_string(), json!(max));
        if exclusive_max {
            map.insert("exclusiveMaximum".to_string(), json!(true));
        }
    }
}

fn type_name(schema: &Schema) -> Option<&'static str> {
    match schema {
        Schema::String(_) => Some("string"),
        Schema::Number(_) => Some("number"),
        Schema::Integer(_) => Some("integer"),
        Schema::Boolean(_) => Some("boolean"),
        Schema::Object(_) => Some("object"),
        Schema::Array(_) => Some("array"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_number_collapse_to_integer() {
        let schema = decode_schema(&json!({"type": ["integer", "number"]})).unwrap();
        assert!(matches!(schema, Schema::Integer(_)));
    }

    #[test]
    fn null_becomes_allow_null_flag() {
        let schema = decode_schema(&json!({"type": ["string", "null"]})).unwrap();
        let Schema::String(s) = &schema else {
            panic!("expected string schema");
        };
        assert!(s.base.allow_null);
    }

    #[test]
    fn multiple_non_null_types_become_union() {
        let schema = decode_schema(&json!({"type": ["string", "integer"]})).unwrap();
        let Schema::Union(u) = &schema else {
            panic!("expected union");
        };
        assert_eq!(u.members.len(), 2);
    }

    #[test]
    fn unconstrained_struct_is_any() {
        let schema = decode_schema(&json!({})).unwrap();
        assert!(matches!(schema, Schema::Any(_)));
        let titled = decode_schema(&json!({"title": "x"})).unwrap();
        assert!(matches!(titled, Schema::Any(_)));
    }

    #[test]
    fn untyped_with_object_keywords_is_object() {
        let schema =
            decode_schema(&json!({"properties": {"a": {"type": "integer"}}})).unwrap();
        assert!(matches!(schema, Schema::Object(_)));
    }

    #[test]
    fn enum_keyword_wins() {
        let schema = decode_schema(&json!({"enum": ["a", "b"]})).unwrap();
        let Schema::Enum(e) = &schema else {
            panic!("expected enum");
        };
        assert_eq!(e.choices, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn draft4_exclusive_bounds() {
        let schema =
            decode_schema(&json!({"type": "number", "minimum": 0, "exclusiveMinimum": true}))
                .unwrap();
        let Schema::Number(n) = &schema else {
            panic!("expected number");
        };
        assert_eq!(n.minimum, Some(0.0));
        assert!(n.exclusive_minimum);
    }

    #[test]
    fn numeric_exclusive_bounds() {
        let schema =
            decode_schema(&json!({"type": "number", "exclusiveMaximum": 10})).unwrap();
        let Schema::Number(n) = &schema else {
            panic!("expected number");
        };
        assert_eq!(n.maximum, Some(10.0));
        assert!(n.exclusive_maximum);
    }

    #[test]
    fn round_trip_object_schema() {
        let source = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "age": {"type": "integer", "minimum": 0.0},
            },
            "required": ["name"],
            "additionalProperties": false,
        });
        let schema = decode_schema(&source).unwrap();
        let encoded = encode_schema(&schema);
        let again = decode_schema(&encoded).unwrap();
        assert_eq!(schema, again);
    }

    #[test]
    fn invalid_pattern_is_a_parse_error() {
        let err = decode_schema(&json!({"type": "string", "pattern": "("})).unwrap_err();
        assert!(matches!(err, CodecError::Parse(_)));
    }
}
